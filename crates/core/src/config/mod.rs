//! Configuration loading and management.
//!
//! This module loads the client configuration from `suite-kit.toml`, with
//! defaults for every setting and environment overrides on top.

pub mod error;
pub mod loader;
