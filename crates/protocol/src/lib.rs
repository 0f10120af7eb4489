//! # sk-protocol
//!
//! Wire and state models for suite-kit.
//!
//! This crate defines all shared data structures used for:
//! - The engine's control channel (commands and acknowledgements)
//! - The engine's event stream (envelopes and typed progress events)
//! - The client-side pipeline state observed by front ends
//! - Client configuration parsing
//!
//! ## Modules
//!
//! - [`stage_models`]: The five pipeline stages and their per-stage state
//! - [`role_models`]: Per-role progress and review results
//! - [`artifact_models`]: Requirement, architecture, suite and test artifacts
//! - [`state_models`]: The aggregate `PipelineState` and `TaskId`
//! - [`event_models`]: Stream envelopes and `PipelineEvent`
//! - [`ipc`]: Control-channel messages and the `Op`/`Notice` pair
//! - [`config_models`]: Client configuration from `suite-kit.toml`
//!
//! ## Design Principles
//!
//! - Minimal dependencies: only serde, serde_json and ts-rs
//! - TypeScript generation: state types derive `TS` for web front ends
//! - Independent compilation: no dependencies on other suite-kit crates

pub mod artifact_models;
pub mod config_models;
pub mod event_models;
pub mod ipc;
pub mod role_models;
pub mod stage_models;
pub mod state_models;

// Re-export all public types for convenience
pub use artifact_models::*;
pub use config_models::*;
pub use event_models::*;
pub use ipc::*;
pub use role_models::*;
pub use stage_models::*;
pub use state_models::*;
