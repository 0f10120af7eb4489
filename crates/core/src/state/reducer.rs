//! Pipeline state reducer.
//!
//! [`reduce`] folds one [`PipelineEvent`] into a [`PipelineState`]. It is
//! synchronous and performs no I/O; the caller acts on the returned
//! [`Outcome`] (closing the stream on [`Outcome::Terminal`]).

use serde_json::Value;
use sk_protocol::artifact_models::{SystemArchitecture, TestResult};
use sk_protocol::event_models::PipelineEvent;
use sk_protocol::role_models::{RoleProcessState, RoleStatus};
use sk_protocol::stage_models::{Stage, StepStatus};
use sk_protocol::state_models::PipelineState;
use tracing::{debug, warn};

/// What applying an event did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The state changed.
    Applied,
    /// The event did not apply (unknown stage, out-of-range role, stale
    /// chunk, ...). The state is unchanged.
    NoOp,
    /// A terminal event: the run is over and the stream must be closed.
    Terminal,
}

/// Apply `event` to an owned state and return the new state.
pub fn apply(mut state: PipelineState, event: &PipelineEvent) -> (PipelineState, Outcome) {
    let outcome = reduce(&mut state, event);
    (state, outcome)
}

/// Apply `event` to `state` in place.
pub fn reduce(state: &mut PipelineState, event: &PipelineEvent) -> Outcome {
    match event {
        PipelineEvent::PipelineStarted { task_id } => {
            let Some(bound) = &state.task_id else {
                debug!("pipeline_started with no bound task");
                return Outcome::NoOp;
            };
            if let Some(task_id) = task_id {
                if task_id != bound {
                    warn!(%task_id, %bound, "pipeline_started for a different task");
                    return Outcome::NoOp;
                }
            }
            state.is_running = true;
            Outcome::Applied
        }
        PipelineEvent::AgentStarted { stage } => match resolve(stage) {
            Some(stage) => start_stage(state, stage),
            None => Outcome::NoOp,
        },
        PipelineEvent::AgentOutput { stage, chunk, seq } => match resolve(stage) {
            Some(stage) => append_output(state, stage, chunk, *seq),
            None => Outcome::NoOp,
        },
        PipelineEvent::AgentCompleted {
            stage,
            success,
            result,
        } => match resolve(stage) {
            Some(stage) => complete_stage(state, stage, *success, result.as_ref()),
            None => Outcome::NoOp,
        },
        PipelineEvent::RoleStateUpdated {
            role_index,
            status,
            score,
        } => update_role(state, *role_index, *status, *score),
        PipelineEvent::PipelinePaused => {
            // A pause is only meaningful while the task runs.
            if !state.is_running || state.is_paused {
                return Outcome::NoOp;
            }
            state.is_paused = true;
            Outcome::Applied
        }
        PipelineEvent::PipelineResumed => {
            if !state.is_paused {
                return Outcome::NoOp;
            }
            state.is_paused = false;
            Outcome::Applied
        }
        PipelineEvent::PipelineCompleted | PipelineEvent::PipelineCancelled => {
            finish(state);
            Outcome::Terminal
        }
        PipelineEvent::PipelineError { message } => {
            finish(state);
            state.error = Some(message.clone());
            Outcome::Terminal
        }
    }
}

fn resolve(name: &str) -> Option<Stage> {
    let stage = Stage::from_wire(name);
    if stage.is_none() {
        debug!(stage = name, "event for unknown stage");
    }
    stage
}

fn finish(state: &mut PipelineState) {
    state.is_running = false;
    state.is_paused = false;
}

fn start_stage(state: &mut PipelineState, stage: Stage) -> Outcome {
    let status = state.step(stage).status;
    if status.is_terminal() {
        debug!(%stage, ?status, "agent_started for a finished stage");
        return Outcome::NoOp;
    }
    if status == StepStatus::Running {
        return Outcome::NoOp;
    }

    // At most one stage runs; a new start implies the previous one finished.
    if let Some(previous) = state.running_stage() {
        debug!(%previous, next = %stage, "implicitly completing previous stage");
        state.step_mut(previous).status = StepStatus::Completed;
    }

    state.step_mut(stage).status = StepStatus::Running;
    state.current_step_index = state.current_step_index.max(stage.index());
    Outcome::Applied
}

fn append_output(state: &mut PipelineState, stage: Stage, chunk: &str, seq: Option<u64>) -> Outcome {
    let step = state.step_mut(stage);
    if step.status != StepStatus::Running {
        debug!(%stage, status = ?step.status, "output for a stage that is not running");
        return Outcome::NoOp;
    }

    if let Some(seq) = seq {
        if step.last_seq.is_some_and(|last| seq <= last) {
            debug!(%stage, seq, "dropping duplicate output chunk");
            return Outcome::NoOp;
        }
        step.last_seq = Some(seq);
    }

    step.output.push_str(chunk);
    Outcome::Applied
}

fn complete_stage(
    state: &mut PipelineState,
    stage: Stage,
    success: bool,
    result: Option<&Value>,
) -> Outcome {
    let step = state.step_mut(stage);
    if step.status.is_terminal() {
        debug!(%stage, status = ?step.status, "agent_completed for a finished stage");
        return Outcome::NoOp;
    }
    step.status = if success {
        StepStatus::Completed
    } else {
        StepStatus::Error
    };

    if let (true, Some(result)) = (success, result) {
        attach_result(state, stage, result);
    }
    Outcome::Applied
}

fn attach_result(state: &mut PipelineState, stage: Stage, result: &Value) {
    match stage {
        Stage::Analyze => match serde_json::from_value::<SystemArchitecture>(result.clone()) {
            Ok(architecture) => {
                if state.role_states.is_empty() {
                    state.role_states = architecture
                        .roles
                        .iter()
                        .map(|role| {
                            RoleProcessState::pending(role.id.clone(), role.name.clone(), role.role_type)
                        })
                        .collect();
                    state.total_roles = state.role_states.len();
                }
                state.system_architecture = Some(architecture);
            }
            Err(err) => warn!(%stage, %err, "ignoring invalid analyze result"),
        },
        Stage::Test => match serde_json::from_value::<TestResult>(result.clone()) {
            Ok(test_result) => state.test_result = Some(test_result),
            Err(err) => warn!(%stage, %err, "ignoring invalid test result"),
        },
        _ => debug!(%stage, "stage result not tracked"),
    }
}

/// Merge a partial role update into the indexed role.
///
/// `score` is taken only together with `completed`; scores reported during
/// review stay out of `final_score`, which remains 0 until the role
/// completes.
fn update_role(
    state: &mut PipelineState,
    role_index: usize,
    status: RoleStatus,
    score: Option<f64>,
) -> Outcome {
    let Some(role) = state.role_states.get_mut(role_index) else {
        debug!(role_index, known = state.role_states.len(), "update for unknown role");
        return Outcome::NoOp;
    };

    // Each entry into review is one review/optimize iteration.
    if status == RoleStatus::Reviewing && role.status != RoleStatus::Reviewing {
        role.iterations += 1;
    }
    role.status = status;

    match (status, score) {
        (RoleStatus::Completed, Some(score)) => role.final_score = score,
        (_, Some(score)) => debug!(role_index, score, ?status, "score ignored before completion"),
        _ => {}
    }

    if !matches!(status, RoleStatus::Pending) && !status.is_terminal() {
        state.current_role_index = role_index;
    }
    Outcome::Applied
}
