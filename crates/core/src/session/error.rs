//! Error types for the session controller.

use sk_protocol::state_models::TaskId;
use thiserror::Error;

use crate::importer::ImportError;
use crate::transport::TransportError;

/// Errors returned by controller operations.
///
/// Every variant ends the operation but leaves the controller usable.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// A control command failed or was refused by the engine.
    #[error("command rejected: {0}")]
    CommandRejected(#[source] TransportError),

    /// The event stream could not be opened or broke before a terminal event.
    #[error("event stream disconnected: {0}")]
    StreamDisconnected(String),

    /// The engine declined to resume the task.
    #[error("recovery of task {0} was denied")]
    RecoveryDenied(TaskId),

    #[error(transparent)]
    ImportRejected(#[from] ImportError),

    #[error("no task is bound")]
    NoActiveTask,

    #[error("a task is already running")]
    TaskAlreadyRunning,

    #[error("a recovery is already in flight")]
    RecoveryInFlight,
}

pub type ControllerResult<T> = Result<T, ControllerError>;
