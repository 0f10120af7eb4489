//! Control-channel protocol.
//!
//! This module defines two sets of messages:
//! - The engine's request/acknowledgement types for the control channel
//!   (`create`, `pause`, `resume`, `cancel`, `list_incomplete`, `recover`).
//! - The `Op`/`Notice` pair used between a front end and the session
//!   controller's drive loop.
//!
//! Engine responses are wrapped in an [`ApiResponse`] envelope:
//! ```json
//! { "success": true, "data": { "taskId": "3f2a..." } }
//! { "success": false, "error": "API key is not configured" }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::artifact_models::Requirement;
use crate::state_models::TaskId;

/// Standard engine response envelope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Split the envelope into its payload or the engine's error message.
    ///
    /// A successful response without `data` yields `Ok(None)`.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self
                .error
                .unwrap_or_else(|| "engine reported failure without a message".to_string()))
        }
    }
}

/// Body of the create-task command.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct CreateTaskRequest {
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub model: String,
}

impl From<&Requirement> for CreateTaskRequest {
    fn from(requirement: &Requirement) -> Self {
        Self {
            description: requirement.description.clone(),
            kind: requirement.kind.clone(),
            model: requirement.target_model.clone(),
        }
    }
}

/// Acknowledgement of the create-task command.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskAck {
    pub task_id: TaskId,
}

/// Body of the pause, resume and cancel commands.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct TaskCommand {
    pub task_id: TaskId,
}

/// Body of the recover command.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct RecoverRequest {
    pub task_id: TaskId,
    /// Whether the engine may process the remaining roles in parallel.
    pub parallel: bool,
}

/// Acknowledgement of the recover command.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct RecoverAck {
    pub task_id: TaskId,
    pub resumed: bool,
}

/// A task left incomplete by a previous session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct IncompleteTask {
    pub task_id: TaskId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub completed_roles: usize,
    #[serde(default)]
    pub total_roles: usize,
    /// ISO-8601 timestamp as reported by the engine.
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Operations sent from a front end to the session controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Create a task for `requirement` and attach to its stream.
    StartPipeline { requirement: Requirement },

    /// Ask the engine to pause the bound task.
    PausePipeline,

    /// Ask the engine to resume the bound task.
    ResumePipeline,

    /// Cancel the bound task and detach immediately.
    CancelPipeline,

    /// Discard all state and detach.
    Reset,

    /// Query tasks left incomplete by a previous session.
    ListIncomplete,

    /// Re-attach to an incomplete task.
    RecoverTask { task_id: TaskId },

    /// Seed the state from an exported suite file's JSON content.
    ImportSuite { artifact: Value },

    /// Stop the drive loop.
    Shutdown,
}

/// Replies from the drive loop that are not visible in the state itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Result of `Op::ListIncomplete`.
    IncompleteTasks(Vec<IncompleteTask>),

    /// A suite was imported.
    SuiteImported { system_name: String, roles: usize },

    /// The event stream was closed, either by a terminal event or locally.
    StreamClosed { task_id: Option<TaskId> },

    /// An operation failed. The state carries the error as well when the
    /// failure is one the store records.
    OperationFailed { op: &'static str, message: String },
}
