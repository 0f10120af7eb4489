//! Common test utilities shared by the integration tests.
//!
//! This module provides:
//! - Test fixtures (configs, requirements, event messages, suites)
//! - A scripted mock engine implementing both channels
//! - Custom assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_engine;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_engine::*;
