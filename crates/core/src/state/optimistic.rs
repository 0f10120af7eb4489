//! Optimistic pause/resume transitions.
//!
//! When the engine acknowledges a pause or resume command, the store flips
//! `is_paused` immediately and records an [`OptimisticTransition`]. The
//! matching `pipeline_paused`/`pipeline_resumed` event settles it. What
//! happens when that event never arrives is decided by the
//! [`ConfirmationPolicy`].

use sk_protocol::config_models::ClientConfig;
use std::time::Duration;
use tokio::time::Instant;

/// Direction of an optimistic flag flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Pause,
    Resume,
}

impl Transition {
    /// Value of `is_paused` once this transition holds.
    pub fn paused(self) -> bool {
        matches!(self, Transition::Pause)
    }
}

/// What to do when the confirming event never arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmationPolicy {
    /// Keep the optimistic flag until an event says otherwise.
    #[default]
    TrustForever,
    /// Revert the flag if no confirmation arrives within the duration.
    RevertAfter(Duration),
}

impl ConfirmationPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        match config.confirm_timeout_secs {
            Some(secs) if secs > 0 => ConfirmationPolicy::RevertAfter(Duration::from_secs(secs)),
            _ => ConfirmationPolicy::TrustForever,
        }
    }
}

/// A flag flip applied ahead of the engine's confirming event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimisticTransition {
    pub transition: Transition,
    pub issued_at: Instant,
}

impl OptimisticTransition {
    pub fn new(transition: Transition) -> Self {
        Self {
            transition,
            issued_at: Instant::now(),
        }
    }

    /// The instant after which `policy` reverts this transition, if any.
    pub fn deadline(&self, policy: ConfirmationPolicy) -> Option<Instant> {
        match policy {
            ConfirmationPolicy::TrustForever => None,
            ConfirmationPolicy::RevertAfter(after) => Some(self.issued_at + after),
        }
    }

    pub fn is_expired(&self, policy: ConfirmationPolicy, now: Instant) -> bool {
        self.deadline(policy).is_some_and(|deadline| now >= deadline)
    }
}
