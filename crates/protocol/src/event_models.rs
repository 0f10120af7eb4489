//! Progress events pushed by the engine over the event stream.
//!
//! Every stream message is a JSON [`Envelope`] `{type, data}`. The decoder in
//! `sk-core` turns envelopes into the closed set of [`PipelineEvent`]s using
//! the payload types below.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::role_models::RoleStatus;
use crate::state_models::TaskId;

/// Raw message as it appears on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Event kinds understood by the reducer.
pub mod kinds {
    pub const PIPELINE_STARTED: &str = "pipeline_started";
    pub const AGENT_STARTED: &str = "agent_started";
    pub const AGENT_OUTPUT: &str = "agent_output";
    pub const AGENT_COMPLETED: &str = "agent_completed";
    pub const ROLE_STATE_UPDATED: &str = "role_state_updated";
    pub const PIPELINE_PAUSED: &str = "pipeline_paused";
    pub const PIPELINE_RESUMED: &str = "pipeline_resumed";
    pub const PIPELINE_COMPLETED: &str = "pipeline_completed";
    pub const PIPELINE_ERROR: &str = "pipeline_error";
    pub const PIPELINE_CANCELLED: &str = "pipeline_cancelled";
}

/// A validated progress event.
///
/// Stage names are kept as received; the reducer resolves them and treats
/// unknown names as no-ops.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    PipelineStarted {
        task_id: Option<TaskId>,
    },
    AgentStarted {
        stage: String,
    },
    AgentOutput {
        stage: String,
        chunk: String,
        /// Per-stage sequence number, when the engine provides one.
        seq: Option<u64>,
    },
    AgentCompleted {
        stage: String,
        success: bool,
        /// Stage artifact, when the engine attaches one.
        result: Option<Value>,
    },
    RoleStateUpdated {
        role_index: usize,
        status: RoleStatus,
        score: Option<f64>,
    },
    PipelinePaused,
    PipelineResumed,
    PipelineCompleted,
    PipelineError {
        message: String,
    },
    PipelineCancelled,
}

impl PipelineEvent {
    /// Wire name of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineEvent::PipelineStarted { .. } => kinds::PIPELINE_STARTED,
            PipelineEvent::AgentStarted { .. } => kinds::AGENT_STARTED,
            PipelineEvent::AgentOutput { .. } => kinds::AGENT_OUTPUT,
            PipelineEvent::AgentCompleted { .. } => kinds::AGENT_COMPLETED,
            PipelineEvent::RoleStateUpdated { .. } => kinds::ROLE_STATE_UPDATED,
            PipelineEvent::PipelinePaused => kinds::PIPELINE_PAUSED,
            PipelineEvent::PipelineResumed => kinds::PIPELINE_RESUMED,
            PipelineEvent::PipelineCompleted => kinds::PIPELINE_COMPLETED,
            PipelineEvent::PipelineError { .. } => kinds::PIPELINE_ERROR,
            PipelineEvent::PipelineCancelled => kinds::PIPELINE_CANCELLED,
        }
    }

    /// Terminal events end the run and close the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineEvent::PipelineCompleted
                | PipelineEvent::PipelineError { .. }
                | PipelineEvent::PipelineCancelled
        )
    }
}

/// Payload of `pipeline_started`.
#[derive(Deserialize, Debug, Default)]
pub struct StartedPayload {
    #[serde(rename = "taskId", default)]
    pub task_id: Option<TaskId>,
}

/// Payload of `agent_started`.
///
/// The engine names the field `agent`; `stage` is accepted as well.
#[derive(Deserialize, Debug)]
pub struct StagePayload {
    #[serde(alias = "agent")]
    pub stage: String,
}

/// Payload of `agent_output`.
#[derive(Deserialize, Debug)]
pub struct OutputPayload {
    #[serde(alias = "agent")]
    pub stage: String,
    pub chunk: String,
    #[serde(default)]
    pub seq: Option<u64>,
}

/// Payload of `agent_completed`.
#[derive(Deserialize, Debug)]
pub struct CompletedPayload {
    #[serde(alias = "agent")]
    pub stage: String,
    pub success: bool,
    #[serde(default)]
    pub result: Option<Value>,
}

/// Payload of `role_state_updated`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdatePayload {
    pub role_index: usize,
    pub status: RoleStatus,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Payload of `pipeline_error`.
///
/// The engine names the field `error`; `message` is accepted as well.
#[derive(Deserialize, Debug, Default)]
pub struct ErrorPayload {
    #[serde(alias = "error", default)]
    pub message: Option<String>,
}
