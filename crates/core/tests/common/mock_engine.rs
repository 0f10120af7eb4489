//! Scripted engine for deterministic controller tests.

use async_trait::async_trait;
use sk_core::transport::{
    ControlChannel, EventChannel, RawEventStream, TransportError, TransportResult,
};
use sk_protocol::ipc::{CreateTaskAck, CreateTaskRequest, IncompleteTask, RecoverAck};
use sk_protocol::state_models::TaskId;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// A command the engine received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(CreateTaskRequest),
    Pause(TaskId),
    Resume(TaskId),
    Cancel(TaskId),
    ListIncomplete,
    Recover(TaskId, bool),
    Open(TaskId),
}

#[derive(Default)]
struct Script {
    calls: Vec<Call>,
    rejected: Vec<&'static str>,
    task_id: Option<String>,
    recover: Option<RecoverAck>,
    recover_hangs: bool,
    cancel_hangs: bool,
    incomplete: Vec<IncompleteTask>,
    stream_unavailable: bool,
    streams: VecDeque<RawEventStream>,
}

/// Engine double implementing [`ControlChannel`] and [`EventChannel`].
///
/// Clones share one script, so a test can keep a handle after moving the
/// engine into a controller.
#[derive(Clone, Default)]
pub struct MockEngine {
    script: Arc<Mutex<Script>>,
}

#[allow(dead_code)]
impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `op` fail with a rejection.
    ///
    /// `op` is one of `create`, `pause`, `resume`, `cancel`,
    /// `list_incomplete`, `recover`.
    pub fn reject(&self, op: &'static str) {
        self.script.lock().unwrap().rejected.push(op);
    }

    /// Task id acknowledged by `create` (default `t1`).
    pub fn create_returns(&self, task_id: &str) {
        self.script.lock().unwrap().task_id = Some(task_id.to_string());
    }

    pub fn recover_returns(&self, task_id: &str, resumed: bool) {
        self.script.lock().unwrap().recover = Some(RecoverAck {
            task_id: TaskId::new(task_id),
            resumed,
        });
    }

    /// `recover` never answers.
    pub fn hang_recover(&self) {
        self.script.lock().unwrap().recover_hangs = true;
    }

    /// `cancel` never answers.
    pub fn hang_cancel(&self) {
        self.script.lock().unwrap().cancel_hangs = true;
    }

    pub fn set_incomplete(&self, tasks: Vec<IncompleteTask>) {
        self.script.lock().unwrap().incomplete = tasks;
    }

    /// Opening a stream fails.
    pub fn fail_stream_open(&self) {
        self.script.lock().unwrap().stream_unavailable = true;
    }

    /// Queue a stream that yields `messages` and then ends.
    pub fn push_stream(&self, messages: Vec<String>) {
        let stream = tokio_stream::iter(messages.into_iter().map(Ok::<String, TransportError>));
        self.script.lock().unwrap().streams.push_back(Box::pin(stream));
    }

    /// Queue a stream fed by the returned handle. It ends when the handle
    /// is dropped.
    pub fn push_feed(&self) -> EventFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.script
            .lock()
            .unwrap()
            .streams
            .push_back(Box::pin(UnboundedReceiverStream::new(rx)));
        EventFeed { tx }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    fn record(&self, op: &'static str, call: Call) -> TransportResult<()> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(call);
        if script.rejected.contains(&op) {
            return Err(TransportError::Rejected {
                endpoint: op,
                message: format!("{op} refused"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ControlChannel for MockEngine {
    async fn create(&self, request: &CreateTaskRequest) -> TransportResult<CreateTaskAck> {
        self.record("create", Call::Create(request.clone()))?;
        let task_id = self.script.lock().unwrap().task_id.clone();
        Ok(CreateTaskAck {
            task_id: TaskId::new(task_id.unwrap_or_else(|| "t1".to_string())),
        })
    }

    async fn pause(&self, task_id: &TaskId) -> TransportResult<()> {
        self.record("pause", Call::Pause(task_id.clone()))
    }

    async fn resume(&self, task_id: &TaskId) -> TransportResult<()> {
        self.record("resume", Call::Resume(task_id.clone()))
    }

    async fn cancel(&self, task_id: &TaskId) -> TransportResult<()> {
        self.record("cancel", Call::Cancel(task_id.clone()))?;
        let hangs = self.script.lock().unwrap().cancel_hangs;
        if hangs {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn list_incomplete(&self) -> TransportResult<Vec<IncompleteTask>> {
        self.record("list_incomplete", Call::ListIncomplete)?;
        Ok(self.script.lock().unwrap().incomplete.clone())
    }

    async fn recover(&self, task_id: &TaskId, parallel: bool) -> TransportResult<RecoverAck> {
        self.record("recover", Call::Recover(task_id.clone(), parallel))?;
        let (hangs, ack) = {
            let script = self.script.lock().unwrap();
            (script.recover_hangs, script.recover.clone())
        };
        if hangs {
            std::future::pending::<()>().await;
        }
        Ok(ack.unwrap_or_else(|| RecoverAck {
            task_id: task_id.clone(),
            resumed: true,
        }))
    }
}

#[async_trait]
impl EventChannel for MockEngine {
    async fn open(&self, task_id: &TaskId) -> TransportResult<RawEventStream> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Open(task_id.clone()));
        if script.stream_unavailable {
            return Err(TransportError::Rejected {
                endpoint: "stream",
                message: "HTTP 503 Service Unavailable".to_string(),
            });
        }
        let stream: RawEventStream = match script.streams.pop_front() {
            Some(stream) => stream,
            None => Box::pin(tokio_stream::pending::<TransportResult<String>>()),
        };
        Ok(stream)
    }
}

/// Sender side of a live mock stream.
pub struct EventFeed {
    tx: mpsc::UnboundedSender<TransportResult<String>>,
}

#[allow(dead_code)]
impl EventFeed {
    pub fn send(&self, raw: impl Into<String>) {
        let _ = self.tx.send(Ok(raw.into()));
    }

    pub fn fail(&self, reason: &str) {
        let _ = self.tx.send(Err(TransportError::Stream(reason.to_string())));
    }
}
