use sk_protocol::event_models::PipelineEvent;
use sk_protocol::state_models::PipelineState;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::optimistic::{ConfirmationPolicy, OptimisticTransition, Transition};
use super::reducer::{reduce, Outcome};

/// Holds the [`PipelineState`] of one controller and publishes a snapshot
/// to observers after every change.
///
/// The store is owned by a single controller and mutated through `&mut
/// self`; observers only ever see cloned snapshots through
/// [`PipelineStore::subscribe`].
#[derive(Debug)]
pub struct PipelineStore {
    state: PipelineState,
    pending: Option<OptimisticTransition>,
    policy: ConfirmationPolicy,
    snapshots: watch::Sender<PipelineState>,
}

impl Default for PipelineStore {
    fn default() -> Self {
        Self::new(ConfirmationPolicy::default())
    }
}

impl PipelineStore {
    pub fn new(policy: ConfirmationPolicy) -> Self {
        let state = PipelineState::new();
        let (snapshots, _) = watch::channel(state.clone());
        Self {
            state,
            pending: None,
            policy,
            snapshots,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn policy(&self) -> ConfirmationPolicy {
        self.policy
    }

    /// Receive a snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.snapshots.subscribe()
    }

    pub fn pending(&self) -> Option<OptimisticTransition> {
        self.pending
    }

    /// Apply one decoded event.
    pub fn dispatch(&mut self, event: &PipelineEvent) -> Outcome {
        let outcome = reduce(&mut self.state, event);

        // Pause/resume events are authoritative, terminal events end the run.
        if matches!(
            event,
            PipelineEvent::PipelinePaused | PipelineEvent::PipelineResumed
        ) || outcome == Outcome::Terminal
        {
            if let Some(pending) = self.pending.take() {
                debug!(transition = ?pending.transition, kind = event.kind(), "optimistic transition settled");
            }
        }

        if outcome != Outcome::NoOp {
            self.publish();
        }
        outcome
    }

    /// Replace the whole state, dropping any pending transition.
    pub fn replace(&mut self, state: PipelineState) {
        self.state = state;
        self.pending = None;
        self.publish();
    }

    /// Back to the pristine state.
    pub fn reset(&mut self) {
        self.replace(PipelineState::new());
    }

    /// Mutate the state outside the reducer (task binding, surfaced errors).
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut PipelineState),
    {
        f(&mut self.state);
        self.publish();
    }

    /// Set the surfaced error without touching anything else.
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.update(|state| state.error = Some(message));
    }

    /// End the run locally: not running, not paused, nothing pending.
    pub fn stop(&mut self) {
        self.pending = None;
        self.update(|state| {
            state.is_running = false;
            state.is_paused = false;
        });
    }

    /// Flip `is_paused` ahead of the confirming event.
    pub fn begin_transition(&mut self, transition: Transition) {
        self.pending = Some(OptimisticTransition::new(transition));
        self.update(|state| state.is_paused = transition.paused());
    }

    /// When the current pending transition stops being trusted.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.pending.and_then(|pending| pending.deadline(self.policy))
    }

    /// Revert an unconfirmed transition whose deadline passed.
    ///
    /// Returns `true` if a transition was reverted.
    pub fn expire_pending(&mut self, now: Instant) -> bool {
        let Some(pending) = self.pending else {
            return false;
        };
        if !pending.is_expired(self.policy, now) {
            return false;
        }

        warn!(transition = ?pending.transition, "no confirmation from engine, reverting");
        self.pending = None;
        let running = self.state.is_running;
        self.update(|state| state.is_paused = running && !pending.transition.paused());
        true
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.clone());
    }
}
