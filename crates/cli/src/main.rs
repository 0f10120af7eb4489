mod commands;
mod render;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use sk_core::config::loader::load_config;
use sk_core::session::SessionController;
use sk_core::transport::HttpEngine;
use sk_protocol::artifact_models::Requirement;
use sk_protocol::config_models::ClientConfig;
use sk_protocol::ipc::{Notice, Op};
use sk_protocol::state_models::TaskId;
use std::io::BufRead;
use std::path::PathBuf;
use tokio::select;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use render::{Printer, Render};

type Controller = SessionController<HttpEngine, HttpEngine>;

#[derive(Parser, Debug)]
#[command(name = "suite", version, about = "Generate prompt suites with a pipeline engine")]
struct Cli {
    /// Config file (defaults to ./suite-kit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Engine base URL, overriding the config file and environment
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a new task and follow its progress
    Run {
        /// What the generated system should do
        #[arg(short, long)]
        description: String,

        /// Prompt type (defaults to `default_type` from config)
        #[arg(long = "type")]
        kind: Option<String>,

        /// Target model (defaults to `default_model` from config)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List tasks left incomplete by earlier sessions
    Incomplete,

    /// Resume an incomplete task and follow its progress
    Recover {
        task_id: String,

        /// Ask the engine to process the remaining roles one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Load an exported suite file and print its summary
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = std::env::current_dir().wrap_err("cannot determine working directory")?;
    let config = load_config(&root, cli.config.as_deref(), cli.base_url.as_deref()).await?;

    match cli.command {
        Command::Run {
            description,
            kind,
            model,
        } => {
            let requirement = Requirement::new(
                description,
                kind.unwrap_or_else(|| config.default_type.clone()),
                model.unwrap_or_else(|| config.default_model.clone()),
            );
            let mut controller = SessionController::http(&config);
            follow(&mut controller, Op::StartPipeline { requirement }).await
        }
        Command::Incomplete => {
            let controller = SessionController::http(&config);
            let tasks = controller.list_incomplete().await?;
            for line in render::incomplete_table(&tasks) {
                println!("{line}");
            }
            Ok(())
        }
        Command::Recover {
            task_id,
            sequential,
        } => {
            let config = ClientConfig {
                parallel: config.parallel && !sequential,
                ..config
            };
            let mut controller = SessionController::http(&config);
            follow(
                &mut controller,
                Op::RecoverTask {
                    task_id: TaskId::new(task_id),
                },
            )
            .await
        }
        Command::Import { file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .wrap_err_with(|| format!("cannot read {}", file.display()))?;
            let artifact: serde_json::Value = serde_json::from_str(&content)
                .wrap_err_with(|| format!("{} is not valid JSON", file.display()))?;

            let mut controller = SessionController::http(&config);
            controller.import(&artifact)?;
            for line in render::summary(controller.state()) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

/// Drive the controller from `first` until the run ends.
///
/// Stdin lines map to pause/resume/cancel; Ctrl-C cancels.
async fn follow(controller: &mut Controller, first: Op) -> color_eyre::Result<()> {
    let (op_tx, op_rx) = mpsc::unbounded_channel();
    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let mut snapshots = controller.subscribe();

    spawn_stdin_reader(op_tx.clone());
    let interrupt = op_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = interrupt.send(Op::CancelPipeline);
        }
    });

    eprintln!("{}", commands::HELP);
    op_tx.send(first)?;

    // Prints snapshot changes and stops the drive loop once the run is over.
    // Ends when the drive loop drops its notice sender.
    let supervisor = async move {
        let mut printer = Printer::default();
        let mut prev = snapshots.borrow_and_update().clone();
        loop {
            select! {
                notice = notice_rx.recv() => match notice {
                    None => break,
                    Some(Notice::StreamClosed { .. }) => {
                        let _ = op_tx.send(Op::Shutdown);
                    }
                    Some(Notice::OperationFailed { op, message }) => {
                        tracing::warn!(op, %message, "operation failed");
                        if matches!(op, "start" | "recover" | "stream") {
                            let _ = op_tx.send(Op::Shutdown);
                        }
                    }
                    Some(_) => {}
                },
                Ok(()) = snapshots.changed() => {
                    let next = snapshots.borrow_and_update().clone();
                    printer.emit(render::diff(&prev, &next));
                    prev = next;
                }
            }
        }
        let last = snapshots.borrow().clone();
        printer.emit(render::diff(&prev, &last));
        printer.emit(vec![Render::Line(String::new())]);
    };

    tokio::join!(controller.drive(op_rx, notice_tx), supervisor);

    let state = controller.state();
    for line in render::summary(state) {
        println!("{line}");
    }

    match &state.error {
        Some(error) => Err(eyre!("{error}")),
        None => Ok(()),
    }
}

/// Forward stdin commands on a plain thread; a blocking read must not hold
/// up runtime shutdown.
fn spawn_stdin_reader(op_tx: mpsc::UnboundedSender<Op>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match commands::parse_command(&line) {
                Some(op) => {
                    if op_tx.send(op).is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => eprintln!("unknown command: {}. {}", line.trim(), commands::HELP),
            }
        }
    });
}
