//! Re-attaching to tasks left incomplete by an earlier session.

use sk_protocol::ipc::IncompleteTask;
use sk_protocol::state_models::{PipelineState, TaskId};
use tracing::{info, warn};

use super::controller::SessionController;
use super::error::{ControllerError, ControllerResult};
use crate::transport::{ControlChannel, EventChannel};

impl<C, E> SessionController<C, E>
where
    C: ControlChannel,
    E: EventChannel,
{
    /// Tasks the engine still holds from earlier sessions. Read-only.
    pub async fn list_incomplete(&self) -> ControllerResult<Vec<IncompleteTask>> {
        self.control()
            .list_incomplete()
            .await
            .map_err(ControllerError::CommandRejected)
    }

    /// Resume `task_id` and attach to its stream.
    ///
    /// The engine replays what the task already produced on the new stream.
    ///
    /// # Errors
    ///
    /// - `TaskAlreadyRunning` / `RecoveryInFlight` without contacting the engine
    /// - `CommandRejected` if the command fails; only `error` changes
    /// - `RecoveryDenied` if the engine answers `resumed: false`; only
    ///   `error` changes
    /// - `StreamDisconnected` if the stream of the resumed task cannot be opened
    ///
    /// The in-flight flag stays set if this future is dropped before the
    /// engine answers; [`SessionController::reset`] clears it.
    pub async fn recover(&mut self, task_id: TaskId) -> ControllerResult<TaskId> {
        self.ensure_idle()?;

        self.recovery_in_flight = true;
        let result = self.control().recover(&task_id, self.parallel).await;
        self.recovery_in_flight = false;

        let ack = match result {
            Ok(ack) => ack,
            Err(err) => return Err(self.reject("recover", err)),
        };

        if !ack.resumed {
            warn!(%task_id, "engine declined to resume task");
            self.store
                .set_error(format!("task {task_id} could not be resumed"));
            return Err(ControllerError::RecoveryDenied(ack.task_id));
        }

        info!(task_id = %ack.task_id, parallel = self.parallel, "task resumed");
        self.close_stream();
        self.store.replace(PipelineState::new());
        self.attach(ack.task_id.clone()).await?;
        Ok(ack.task_id)
    }
}
