//! Seeding a [`PipelineState`] from an exported prompt suite.
//!
//! Exports are either the bare suite or a wrapper `{"promptSuite": {...}}`.
//! The imported state is a finished, read-only view: every role completed,
//! no task bound.

use serde_json::Value;
use sk_protocol::artifact_models::PromptSuite;
use sk_protocol::role_models::{RoleProcessState, RoleStatus};
use sk_protocol::state_models::PipelineState;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("suite artifact must be a JSON object")]
    NotAnObject,

    #[error("suite artifact has no prompts")]
    MissingPrompts,

    #[error("suite prompts must be an array")]
    PromptsNotArray,

    #[error("invalid suite artifact: {0}")]
    InvalidSuite(#[source] serde_json::Error),
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Build a fresh state from an exported suite.
pub fn import_suite(artifact: &Value) -> ImportResult<PipelineState> {
    let suite = artifact
        .get("promptSuite")
        .filter(|inner| !inner.is_null())
        .unwrap_or(artifact);

    let object = suite.as_object().ok_or(ImportError::NotAnObject)?;
    match object.get("prompts") {
        None | Some(Value::Null) => return Err(ImportError::MissingPrompts),
        Some(Value::Array(_)) => {}
        Some(_) => return Err(ImportError::PromptsNotArray),
    }

    let suite: PromptSuite =
        serde_json::from_value(suite.clone()).map_err(ImportError::InvalidSuite)?;

    let role_states: Vec<RoleProcessState> = suite
        .prompts
        .iter()
        .map(|prompt| RoleProcessState {
            status: RoleStatus::Completed,
            prompt: prompt.prompt.clone(),
            ..RoleProcessState::pending(
                prompt.role_id.clone(),
                prompt.role_name.clone(),
                prompt.role_type,
            )
        })
        .collect();

    let total_roles = if suite.total_roles > 0 {
        suite.total_roles
    } else {
        role_states.len()
    };
    debug!(system = %suite.system_name, total_roles, "suite imported");

    Ok(PipelineState {
        role_states,
        total_roles,
        prompt_suite: Some(suite),
        ..PipelineState::new()
    })
}
