//! Client configuration models for `suite-kit.toml`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Represents client settings from `suite-kit.toml`.
///
/// Every field has a default, so an empty file (or no file) is valid.
///
/// # Example
///
/// ```toml
/// base_url = "http://127.0.0.1:5000"
/// parallel = true
/// request_timeout_secs = 30
/// confirm_timeout_secs = 10
/// default_type = "general"
/// default_model = "claude-sonnet-4-5"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the engine, without the `/api` suffix.
    pub base_url: String,

    /// Parallel-execution preference sent with recover commands.
    pub parallel: bool,

    /// Timeout for control-channel requests. Event streams have no idle timeout.
    pub request_timeout_secs: u64,

    /// How long an optimistic pause/resume waits for its confirming event
    /// before it is reverted. Unset means the optimistic flag is kept until
    /// the engine says otherwise.
    pub confirm_timeout_secs: Option<u64>,

    /// Prompt type used when none is given.
    pub default_type: String,

    /// Target model used when none is given.
    pub default_model: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            parallel: true,
            request_timeout_secs: 30,
            confirm_timeout_secs: None,
            default_type: "general".to_string(),
            default_model: "claude-sonnet-4-5".to_string(),
        }
    }
}
