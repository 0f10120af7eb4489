//! Custom assertion helpers for controller tests.

use sk_protocol::stage_models::{Stage, StepStatus};
use sk_protocol::state_models::PipelineState;

/// Assert that `state` equals a freshly constructed state.
#[allow(dead_code)]
pub fn assert_pristine(state: &PipelineState) {
    assert_eq!(state, &PipelineState::new(), "state should be pristine");
}

/// Assert the status of every stage, in stage order.
#[allow(dead_code)]
pub fn assert_statuses(state: &PipelineState, expected: [StepStatus; 5]) {
    let actual: Vec<StepStatus> = Stage::ALL.iter().map(|s| state.step(*s).status).collect();
    assert_eq!(actual, expected.to_vec(), "unexpected stage statuses");
}

/// Assert that the run is over and nothing is paused.
#[allow(dead_code)]
pub fn assert_stopped(state: &PipelineState) {
    assert!(!state.is_running, "expected is_running = false");
    assert!(!state.is_paused, "expected is_paused = false");
}
