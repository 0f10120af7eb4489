//! Event envelope decoder.
//!
//! Turns raw stream messages into [`PipelineEvent`]s. Three outcomes:
//! - a typed event for the ten known kinds
//! - [`Decoded::Ignored`] for unknown kinds (keep-alives, newer engine events)
//! - [`MalformedEvent`] when the envelope or a known kind's payload fails
//!   its schema; callers drop the message and keep the stream open

use serde::de::DeserializeOwned;
use serde_json::Value;
use sk_protocol::event_models::{
    kinds, CompletedPayload, Envelope, ErrorPayload, OutputPayload, PipelineEvent,
    RoleUpdatePayload, StagePayload, StartedPayload,
};
use thiserror::Error;

/// Message used when `pipeline_error` carries no message of its own.
pub const DEFAULT_PIPELINE_ERROR: &str = "pipeline failed";

/// Result of decoding one stream message.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Event(PipelineEvent),
    /// A well-formed envelope of a kind this client does not handle.
    Ignored(String),
}

/// A stream message that could not be decoded.
#[derive(Error, Debug)]
pub enum MalformedEvent {
    #[error("message is not a valid event envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("invalid {kind} payload: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type DecodeResult<T> = Result<T, MalformedEvent>;

/// Decode one raw JSON message.
pub fn decode(raw: &str) -> DecodeResult<Decoded> {
    let envelope: Envelope = serde_json::from_str(raw).map_err(MalformedEvent::Envelope)?;
    decode_envelope(envelope)
}

/// Decode an already-parsed envelope.
pub fn decode_envelope(envelope: Envelope) -> DecodeResult<Decoded> {
    let Envelope { kind, data, .. } = envelope;
    // Payload-less kinds are sent with no `data` at all.
    let data = if data.is_null() {
        Value::Object(Default::default())
    } else {
        data
    };

    let event = match kind.as_str() {
        kinds::PIPELINE_STARTED => {
            let payload: StartedPayload = payload(&kind, data)?;
            PipelineEvent::PipelineStarted {
                task_id: payload.task_id,
            }
        }
        kinds::AGENT_STARTED => {
            let payload: StagePayload = payload(&kind, data)?;
            PipelineEvent::AgentStarted {
                stage: payload.stage,
            }
        }
        kinds::AGENT_OUTPUT => {
            let payload: OutputPayload = payload(&kind, data)?;
            PipelineEvent::AgentOutput {
                stage: payload.stage,
                chunk: payload.chunk,
                seq: payload.seq,
            }
        }
        kinds::AGENT_COMPLETED => {
            let payload: CompletedPayload = payload(&kind, data)?;
            PipelineEvent::AgentCompleted {
                stage: payload.stage,
                success: payload.success,
                result: payload.result,
            }
        }
        kinds::ROLE_STATE_UPDATED => {
            let payload: RoleUpdatePayload = payload(&kind, data)?;
            PipelineEvent::RoleStateUpdated {
                role_index: payload.role_index,
                status: payload.status,
                score: payload.score,
            }
        }
        kinds::PIPELINE_PAUSED => PipelineEvent::PipelinePaused,
        kinds::PIPELINE_RESUMED => PipelineEvent::PipelineResumed,
        kinds::PIPELINE_COMPLETED => PipelineEvent::PipelineCompleted,
        kinds::PIPELINE_ERROR => {
            let payload: ErrorPayload = payload(&kind, data)?;
            PipelineEvent::PipelineError {
                message: payload
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_PIPELINE_ERROR.to_string()),
            }
        }
        kinds::PIPELINE_CANCELLED => PipelineEvent::PipelineCancelled,
        _ => return Ok(Decoded::Ignored(kind)),
    };

    Ok(Decoded::Event(event))
}

fn payload<T: DeserializeOwned>(kind: &str, data: Value) -> DecodeResult<T> {
    serde_json::from_value(data).map_err(|source| MalformedEvent::Payload {
        kind: kind.to_string(),
        source,
    })
}
