//! Session control: one task's commands, its event stream and recovery.

pub mod controller;
pub mod error;
pub mod recovery;

pub use controller::{SessionController, StreamItem};
pub use error::{ControllerError, ControllerResult};
