//! Test fixtures: configs, requirements, event messages and suites.

use serde_json::{json, Value};
use sk_core::session::SessionController;
use sk_protocol::artifact_models::Requirement;
use sk_protocol::config_models::ClientConfig;

use super::mock_engine::MockEngine;

/// A controller wired to `engine` for both channels.
#[allow(dead_code)]
pub fn controller(engine: &MockEngine) -> SessionController<MockEngine, MockEngine> {
    controller_with(engine, &ClientConfig::default())
}

#[allow(dead_code)]
pub fn controller_with(
    engine: &MockEngine,
    config: &ClientConfig,
) -> SessionController<MockEngine, MockEngine> {
    SessionController::new(engine.clone(), engine.clone(), config)
}

#[allow(dead_code)]
pub fn requirement() -> Requirement {
    Requirement::new(
        "A support desk assistant".to_string(),
        "general".to_string(),
        "model-x".to_string(),
    )
}

/// One raw stream message of `kind` carrying `data`.
#[allow(dead_code)]
pub fn event(kind: &str, data: Value) -> String {
    json!({ "type": kind, "data": data, "timestamp": "2025-01-01T10:00:00" }).to_string()
}

#[allow(dead_code)]
pub fn started(stage: &str) -> String {
    event("agent_started", json!({ "agent": stage }))
}

#[allow(dead_code)]
pub fn output(stage: &str, chunk: &str) -> String {
    event("agent_output", json!({ "agent": stage, "chunk": chunk }))
}

#[allow(dead_code)]
pub fn completed(stage: &str, success: bool) -> String {
    event("agent_completed", json!({ "agent": stage, "success": success }))
}

#[allow(dead_code)]
pub fn role_update(index: usize, status: &str, score: Option<f64>) -> String {
    let mut data = json!({ "roleIndex": index, "status": status });
    if let Some(score) = score {
        data["score"] = json!(score);
    }
    event("role_state_updated", data)
}

/// Analyzer result describing `roles` roles.
#[allow(dead_code)]
pub fn architecture(roles: usize) -> Value {
    let roles: Vec<Value> = (0..roles)
        .map(|i| json!({ "id": format!("role-{i}"), "name": format!("Role {i}"), "type": "core" }))
        .collect();
    json!({
        "system_name": "Support Desk",
        "system_description": "Routes and answers tickets",
        "roles": roles
    })
}

/// An exported suite as written by the web client.
#[allow(dead_code)]
pub fn suite_artifact() -> Value {
    json!({
        "promptSuite": {
            "system_name": "Support Desk",
            "total_roles": 2,
            "prompts": [
                { "role_id": "triage", "role_name": "Triage", "role_type": "core", "prompt": "You triage." },
                { "role_id": "qa", "role_name": "QA", "role_type": "quality", "prompt": "You check." }
            ]
        }
    })
}
