//! Session controller.
//!
//! Owns one task's command lifecycle, the [`PipelineStore`] and at most one
//! open event stream. All operations take `&mut self`, so the store is only
//! ever touched by one caller at a time.

use serde_json::Value;
use sk_protocol::artifact_models::Requirement;
use sk_protocol::config_models::ClientConfig;
use sk_protocol::event_models::PipelineEvent;
use sk_protocol::ipc::{CreateTaskRequest, Notice, Op};
use sk_protocol::state_models::{PipelineState, TaskId};
use tokio::select;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use super::error::{ControllerError, ControllerResult};
use crate::decoder::{decode, Decoded};
use crate::importer::import_suite;
use crate::state::{ConfirmationPolicy, Outcome, PipelineStore, Transition};
use crate::transport::{
    ControlChannel, EventChannel, HttpEngine, RawEventStream, TransportError, TransportResult,
};

/// What one read from the event stream produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem {
    /// A decoded event and what applying it did.
    Event(PipelineEvent, Outcome),
    /// A well-formed message of a kind the client does not handle.
    Ignored(String),
    /// An undecodable message that was dropped.
    Malformed(String),
}

/// Drives one pipeline session against an engine.
///
/// `C` carries commands, `E` opens event streams. [`HttpEngine`] implements
/// both; tests plug in scripted channels.
pub struct SessionController<C, E> {
    control: C,
    events: E,
    pub(super) store: PipelineStore,
    stream: Option<RawEventStream>,
    pub(super) recovery_in_flight: bool,
    pub(super) parallel: bool,
}

impl SessionController<HttpEngine, HttpEngine> {
    /// A controller talking HTTP to the engine at `config.base_url`.
    pub fn http(config: &ClientConfig) -> Self {
        let engine = HttpEngine::new(config);
        Self::new(engine.clone(), engine, config)
    }
}

impl<C, E> SessionController<C, E>
where
    C: ControlChannel,
    E: EventChannel,
{
    /// Create a controller.
    ///
    /// The confirmation policy and recovery parallelism come from `config`.
    pub fn new(control: C, events: E, config: &ClientConfig) -> Self {
        Self {
            control,
            events,
            store: PipelineStore::new(ConfirmationPolicy::from_config(config)),
            stream: None,
            recovery_in_flight: false,
            parallel: config.parallel,
        }
    }

    pub fn state(&self) -> &PipelineState {
        self.store.state()
    }

    /// Snapshots published after every state change.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.store.subscribe()
    }

    /// Whether an event stream is currently open.
    pub fn is_attached(&self) -> bool {
        self.stream.is_some()
    }

    pub fn recovery_in_flight(&self) -> bool {
        self.recovery_in_flight
    }

    pub(super) fn control(&self) -> &C {
        &self.control
    }

    /// Create a task for `requirement` and attach to its event stream.
    ///
    /// # Errors
    ///
    /// - `TaskAlreadyRunning` / `RecoveryInFlight` without contacting the engine
    /// - `CommandRejected` if the engine refuses the task; the state carries
    ///   the error and nothing runs
    /// - `StreamDisconnected` if the task was created but its stream could
    ///   not be opened
    pub async fn start(&mut self, requirement: Requirement) -> ControllerResult<TaskId> {
        self.ensure_idle()?;

        self.close_stream();
        let request = CreateTaskRequest::from(&requirement);
        self.store.replace(PipelineState::for_requirement(requirement));

        let ack = match self.control.create(&request).await {
            Ok(ack) => ack,
            Err(err) => return Err(self.reject("start", err)),
        };

        info!(task_id = %ack.task_id, kind = %request.kind, "task created");
        self.attach(ack.task_id.clone()).await?;
        Ok(ack.task_id)
    }

    /// Ask the engine to pause the bound task.
    ///
    /// On acknowledgement `is_paused` flips immediately; the
    /// `pipeline_paused` event confirms it.
    pub async fn pause(&mut self) -> ControllerResult<()> {
        self.transition(Transition::Pause).await
    }

    /// Ask the engine to resume the bound task.
    pub async fn resume(&mut self) -> ControllerResult<()> {
        self.transition(Transition::Resume).await
    }

    /// Cancel the bound task and detach.
    ///
    /// The stream is closed and the state stops running before the cancel
    /// command is sent, so observers never wait on the engine. A failed
    /// cancel command is only logged.
    pub async fn cancel(&mut self) {
        let task_id = self.store.state().task_id.clone();
        self.close_stream();
        self.store.stop();

        if let Some(task_id) = task_id {
            match self.control.cancel(&task_id).await {
                Ok(()) => info!(%task_id, "task cancelled"),
                Err(err) => warn!(%task_id, %err, "cancel command failed"),
            }
        }
    }

    /// Drop everything: stream, state, pending transitions, recovery flag.
    pub fn reset(&mut self) {
        self.close_stream();
        self.recovery_in_flight = false;
        self.store.reset();
        debug!("session reset");
    }

    /// Replace the state with an imported suite.
    ///
    /// # Errors
    ///
    /// `TaskAlreadyRunning` while a task runs, `ImportRejected` for an
    /// invalid artifact. The state is untouched on error.
    pub fn import(&mut self, artifact: &Value) -> ControllerResult<()> {
        if self.store.state().is_running {
            return Err(ControllerError::TaskAlreadyRunning);
        }
        let state = import_suite(artifact)?;
        self.close_stream();
        self.store.replace(state);
        Ok(())
    }

    /// Read and apply one message from the open stream.
    ///
    /// Returns `None` when no stream is open.
    pub async fn next_event(&mut self) -> Option<ControllerResult<StreamItem>> {
        let stream = self.stream.as_mut()?;
        let message = stream.next().await;
        Some(self.handle_message(message))
    }

    /// Apply stream messages until the stream closes.
    ///
    /// Returns `Ok` after a terminal event, or the disconnect error.
    pub async fn run_until_idle(&mut self) -> ControllerResult<()> {
        while let Some(item) = self.next_event().await {
            item?;
        }
        Ok(())
    }

    /// Serve `ops` while applying stream messages, until `Op::Shutdown` or
    /// the op channel closes.
    ///
    /// Results that are not visible in the state are reported on `notices`.
    pub async fn drive(
        &mut self,
        mut ops: mpsc::UnboundedReceiver<Op>,
        notices: mpsc::UnboundedSender<Notice>,
    ) {
        loop {
            let deadline = self.store.pending_deadline();

            select! {
                op = ops.recv() => match op {
                    None | Some(Op::Shutdown) => break,
                    Some(op) => self.handle_op(op, &notices).await,
                },
                message = next_message(&mut self.stream) => {
                    let task_id = self.store.state().task_id.clone();
                    match self.handle_message(message) {
                        Ok(StreamItem::Event(_, Outcome::Terminal)) => {
                            notify(&notices, Notice::StreamClosed { task_id });
                        }
                        Ok(_) => {}
                        Err(err) => {
                            notify(&notices, Notice::StreamClosed { task_id });
                            notify(&notices, Notice::OperationFailed { op: "stream", message: err.to_string() });
                        }
                    }
                },
                _ = wait_until(deadline) => {
                    self.store.expire_pending(Instant::now());
                }
            }
        }

        self.close_stream();
        debug!("drive loop stopped");
    }

    async fn handle_op(&mut self, op: Op, notices: &mpsc::UnboundedSender<Notice>) {
        let (name, result) = match op {
            Op::StartPipeline { requirement } => ("start", self.start(requirement).await.map(|_| ())),
            Op::PausePipeline => ("pause", self.pause().await),
            Op::ResumePipeline => ("resume", self.resume().await),
            Op::CancelPipeline => {
                let task_id = self.store.state().task_id.clone();
                let attached = self.is_attached();
                self.cancel().await;
                if attached {
                    notify(notices, Notice::StreamClosed { task_id });
                }
                ("cancel", Ok(()))
            }
            Op::Reset => {
                self.reset();
                ("reset", Ok(()))
            }
            Op::ListIncomplete => match self.list_incomplete().await {
                Ok(tasks) => {
                    notify(notices, Notice::IncompleteTasks(tasks));
                    ("incomplete", Ok(()))
                }
                Err(err) => ("incomplete", Err(err)),
            },
            Op::RecoverTask { task_id } => ("recover", self.recover(task_id).await.map(|_| ())),
            Op::ImportSuite { artifact } => {
                let result = self.import(&artifact);
                if result.is_ok() {
                    let state = self.store.state();
                    notify(
                        notices,
                        Notice::SuiteImported {
                            system_name: state
                                .prompt_suite
                                .as_ref()
                                .map(|suite| suite.system_name.clone())
                                .unwrap_or_default(),
                            roles: state.total_roles,
                        },
                    );
                }
                ("import", result)
            }
            Op::Shutdown => return,
        };

        if let Err(err) = result {
            notify(
                notices,
                Notice::OperationFailed {
                    op: name,
                    message: err.to_string(),
                },
            );
        }
    }

    fn handle_message(&mut self, message: Option<TransportResult<String>>) -> ControllerResult<StreamItem> {
        self.store.expire_pending(Instant::now());

        let raw = match message {
            Some(Ok(raw)) => raw,
            Some(Err(err)) => return Err(self.disconnect(err.to_string())),
            None => return Err(self.disconnect("stream ended before a terminal event".to_string())),
        };

        match decode(&raw) {
            Ok(Decoded::Event(event)) => {
                let outcome = self.store.dispatch(&event);
                debug!(kind = event.kind(), ?outcome, "event applied");
                if outcome == Outcome::Terminal {
                    info!(kind = event.kind(), task_id = ?self.store.state().task_id, "run finished");
                    self.close_stream();
                }
                Ok(StreamItem::Event(event, outcome))
            }
            Ok(Decoded::Ignored(kind)) => {
                debug!(%kind, "ignoring event");
                Ok(StreamItem::Ignored(kind))
            }
            Err(err) => {
                warn!(%err, "dropping malformed event");
                Ok(StreamItem::Malformed(err.to_string()))
            }
        }
    }

    async fn transition(&mut self, transition: Transition) -> ControllerResult<()> {
        let state = self.store.state();
        let task_id = match (&state.task_id, state.is_running) {
            (Some(task_id), true) => task_id.clone(),
            _ => return Err(ControllerError::NoActiveTask),
        };

        let result = match transition {
            Transition::Pause => self.control.pause(&task_id).await,
            Transition::Resume => self.control.resume(&task_id).await,
        };
        let name = match transition {
            Transition::Pause => "pause",
            Transition::Resume => "resume",
        };
        if let Err(err) = result {
            return Err(self.reject(name, err));
        }

        debug!(%task_id, ?transition, "command acknowledged");
        self.store.begin_transition(transition);
        Ok(())
    }

    /// Bind `task_id`, open its stream and mark the task running.
    pub(super) async fn attach(&mut self, task_id: TaskId) -> ControllerResult<()> {
        match self.events.open(&task_id).await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.store.update(|state| {
                    state.task_id = Some(task_id);
                    state.is_running = true;
                    state.is_paused = false;
                    state.error = None;
                });
                Ok(())
            }
            Err(err) => {
                warn!(%task_id, %err, "could not open event stream");
                let message = err.to_string();
                self.store.update(|state| {
                    state.task_id = Some(task_id);
                    state.is_running = false;
                    state.error = Some(message.clone());
                });
                Err(ControllerError::StreamDisconnected(message))
            }
        }
    }

    pub(super) fn ensure_idle(&self) -> ControllerResult<()> {
        if self.store.state().is_running {
            return Err(ControllerError::TaskAlreadyRunning);
        }
        if self.recovery_in_flight {
            return Err(ControllerError::RecoveryInFlight);
        }
        Ok(())
    }

    /// Record a failed command in the state.
    pub(super) fn reject(&mut self, op: &'static str, err: TransportError) -> ControllerError {
        warn!(op, %err, "command rejected");
        self.store.set_error(err.to_string());
        ControllerError::CommandRejected(err)
    }

    fn disconnect(&mut self, reason: String) -> ControllerError {
        warn!(task_id = ?self.store.state().task_id, %reason, "event stream disconnected");
        self.close_stream();
        self.store.stop();
        self.store.set_error(format!("connection lost: {reason}"));
        ControllerError::StreamDisconnected(reason)
    }

    pub(super) fn close_stream(&mut self) {
        if self.stream.take().is_some() {
            debug!("event stream closed");
        }
    }
}

async fn next_message(stream: &mut Option<RawEventStream>) -> Option<TransportResult<String>> {
    match stream {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn notify(notices: &mpsc::UnboundedSender<Notice>, notice: Notice) {
    if notices.send(notice).is_err() {
        debug!("notice receiver dropped");
    }
}
