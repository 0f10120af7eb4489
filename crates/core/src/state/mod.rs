//! Pipeline state management.
//!
//! This module provides:
//! - The reducer folding engine events into a [`PipelineState`]
//! - [`PipelineStore`], the per-controller container publishing snapshots
//! - Optimistic pause/resume transitions and their confirmation policy
//!
//! [`PipelineState`]: sk_protocol::state_models::PipelineState

pub mod optimistic;
pub mod reducer;
pub mod store;

pub use optimistic::{ConfirmationPolicy, OptimisticTransition, Transition};
pub use reducer::{apply, reduce, Outcome};
pub use store::PipelineStore;
