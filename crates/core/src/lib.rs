//! # sk-core
//!
//! Client-side controller for the prompt-suite generation pipeline.
//!
//! This crate provides:
//! - Configuration loading from `suite-kit.toml`
//! - Decoding of the engine's event envelopes
//! - The pipeline state store and its reducer
//! - Engine transport (control commands and server-sent event streams)
//! - The session controller, task recovery and suite import
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`decoder`]: Event envelope decoding
//! - [`state`]: Reducer, store and optimistic transitions
//! - [`transport`]: Channel traits and the HTTP implementation
//! - [`session`]: Session controller and recovery
//! - [`importer`]: Seeding state from an exported suite

pub mod config;
pub mod decoder;
pub mod importer;
pub mod session;
pub mod state;
pub mod transport;
