//! Artifacts produced by the engine.
//!
//! These use the engine's snake_case field names because they are passed
//! through verbatim from engine payloads and exported suite files.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::role_models::RoleType;

/// What the user asked the pipeline to build.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    /// Prompt type, e.g. `general`.
    #[serde(rename = "type")]
    pub kind: String,
    pub target_model: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl Requirement {
    pub fn new(
        description: impl Into<String>,
        kind: impl Into<String>,
        target_model: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            target_model: target_model.into(),
            description: description.into(),
            features: Vec::new(),
        }
    }
}

/// One role of the analyzed system.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct SystemRole {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub role_type: RoleType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub priority: u32,
}

/// Output of the analyze stage: the named roles of the system to generate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct SystemArchitecture {
    pub system_name: String,
    #[serde(default)]
    pub system_description: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub target_user: String,
    #[serde(default)]
    pub use_cases: Vec<String>,
    #[serde(default)]
    pub roles: Vec<SystemRole>,
}

/// The generated prompt for one role.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct RolePrompt {
    pub role_id: String,
    pub role_name: String,
    #[serde(default)]
    pub role_type: RoleType,
    #[serde(default)]
    pub description: String,
    pub prompt: String,
    #[serde(default)]
    pub input_template: String,
    #[serde(default)]
    pub output_format: String,
    #[serde(default)]
    pub triggers: Vec<String>,
}

/// The final artifact: an ordered list of per-role prompts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct PromptSuite {
    #[serde(default)]
    pub system_name: String,
    #[serde(default)]
    pub total_roles: usize,
    pub prompts: Vec<RolePrompt>,
    #[serde(default)]
    pub workflow_summary: String,
    #[serde(default)]
    pub integration_notes: String,
}

/// Pass/fail counts of the test stage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, TS)]
pub struct TestSummary {
    #[serde(default)]
    pub total_tests: u32,
    #[serde(default)]
    pub passed: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub warnings: u32,
    #[serde(default)]
    pub pass_rate: f64,
    #[serde(default)]
    pub verdict: String,
}

/// Summary of the test stage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct TestResult {
    pub summary: TestSummary,
    #[serde(default)]
    pub recommendations: Vec<String>,
}
