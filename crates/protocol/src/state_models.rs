//! The aggregate pipeline state observed by the presentation layer.
//!
//! A fresh [`PipelineState`] is created for every task attempt. Only the
//! reducer in `sk-core` mutates it; observers receive read-only snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::artifact_models::{PromptSuite, Requirement, SystemArchitecture, TestResult};
use crate::role_models::{ReviewResult, RoleProcessState, RoleStatus};
use crate::stage_models::{AgentStep, Stage, StepStatus};

/// Opaque identifier of an engine task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, TS)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Single source of truth for one task attempt.
///
/// Invariants maintained by the reducer and controller:
/// - `steps` always holds exactly one entry per [`Stage`], in stage order
/// - `current_step_index` never decreases within a run
/// - `is_paused` implies `is_running`
/// - `is_running` implies `task_id.is_some()`
/// - `total_roles == role_states.len()` once the analyzer seeded the roles
///   (an imported suite may declare its own total)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct PipelineState {
    pub current_step_index: usize,
    pub steps: Vec<AgentStep>,
    pub requirement: Option<Requirement>,
    pub system_architecture: Option<SystemArchitecture>,
    pub prompt_suite: Option<PromptSuite>,
    pub review: Option<ReviewResult>,
    pub test_result: Option<TestResult>,
    pub is_running: bool,
    pub is_paused: bool,
    pub error: Option<String>,
    pub role_states: Vec<RoleProcessState>,
    pub current_role_index: usize,
    pub total_roles: usize,
    pub task_id: Option<TaskId>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineState {
    /// The pristine state: every step idle, nothing running, no task bound.
    pub fn new() -> Self {
        Self {
            current_step_index: 0,
            steps: Stage::ALL.into_iter().map(AgentStep::idle).collect(),
            requirement: None,
            system_architecture: None,
            prompt_suite: None,
            review: None,
            test_result: None,
            is_running: false,
            is_paused: false,
            error: None,
            role_states: Vec::new(),
            current_role_index: 0,
            total_roles: 0,
            task_id: None,
        }
    }

    /// A pristine state that remembers what the user asked for.
    pub fn for_requirement(requirement: Requirement) -> Self {
        Self {
            requirement: Some(requirement),
            ..Self::new()
        }
    }

    pub fn step(&self, stage: Stage) -> &AgentStep {
        &self.steps[stage.index()]
    }

    pub fn step_mut(&mut self, stage: Stage) -> &mut AgentStep {
        &mut self.steps[stage.index()]
    }

    /// The stage currently running, if any.
    pub fn running_stage(&self) -> Option<Stage> {
        self.steps
            .iter()
            .find(|step| step.status == StepStatus::Running)
            .map(|step| step.kind)
    }

    /// Number of roles that reached `Completed`.
    pub fn completed_roles(&self) -> usize {
        self.role_states
            .iter()
            .filter(|role| role.status == RoleStatus::Completed)
            .count()
    }

    /// Fraction of completed roles in `0.0..=1.0`; zero when no roles are known.
    pub fn progress(&self) -> f64 {
        if self.total_roles == 0 {
            return 0.0;
        }
        self.completed_roles() as f64 / self.total_roles as f64
    }
}
