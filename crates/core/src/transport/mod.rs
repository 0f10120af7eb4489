//! Engine transport abstraction.
//!
//! The controller talks to the engine over two channels:
//! - [`ControlChannel`]: request/acknowledge commands
//! - [`EventChannel`]: one ordered stream of raw event messages per task
//!
//! [`http::HttpEngine`] implements both over HTTP and server-sent events.
//! Tests substitute scripted implementations.

pub mod http;
pub mod sse;

use async_trait::async_trait;
use sk_protocol::ipc::{CreateTaskAck, CreateTaskRequest, IncompleteTask, RecoverAck};
use sk_protocol::state_models::TaskId;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

pub use http::HttpEngine;

/// Errors raised by either channel.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request never got a response.
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The engine answered with `success: false` or an error status.
    #[error("{endpoint} rejected: {message}")]
    Rejected {
        endpoint: &'static str,
        message: String,
    },

    /// The response body was not the expected envelope.
    #[error("invalid response from {endpoint}: {source}")]
    InvalidResponse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A successful response carried no `data`.
    #[error("{endpoint} returned no data")]
    MissingData { endpoint: &'static str },

    /// The event stream failed mid-flight.
    #[error("event stream failed: {0}")]
    Stream(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Raw messages of one task's event stream, in delivery order.
///
/// Dropping the stream closes it.
pub type RawEventStream = Pin<Box<dyn Stream<Item = TransportResult<String>> + Send>>;

/// Command side of the engine.
#[async_trait]
pub trait ControlChannel: Send + Sync {
    async fn create(&self, request: &CreateTaskRequest) -> TransportResult<CreateTaskAck>;
    async fn pause(&self, task_id: &TaskId) -> TransportResult<()>;
    async fn resume(&self, task_id: &TaskId) -> TransportResult<()>;
    async fn cancel(&self, task_id: &TaskId) -> TransportResult<()>;
    async fn list_incomplete(&self) -> TransportResult<Vec<IncompleteTask>>;
    async fn recover(&self, task_id: &TaskId, parallel: bool) -> TransportResult<RecoverAck>;
}

/// Event side of the engine.
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// Open the event stream of `task_id`.
    async fn open(&self, task_id: &TaskId) -> TransportResult<RawEventStream>;
}
