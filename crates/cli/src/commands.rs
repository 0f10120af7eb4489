//! Interactive commands typed while a run streams.

use sk_protocol::ipc::Op;

/// Help line printed when a run starts.
pub const HELP: &str = "commands: /pause (p), /resume (r), /cancel (c)";

/// Parse one line of user input into an operation.
///
/// Slash commands and their one-letter shortcuts are accepted. Returns
/// `None` for blank or unknown input.
pub fn parse_command(input: &str) -> Option<Op> {
    match input.split_whitespace().next()? {
        "/pause" | "p" => Some(Op::PausePipeline),
        "/resume" | "r" => Some(Op::ResumePipeline),
        "/cancel" | "c" => Some(Op::CancelPipeline),
        _ => None,
    }
}
