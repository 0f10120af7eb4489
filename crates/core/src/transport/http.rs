//! HTTP implementation of the engine channels.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sk_protocol::config_models::ClientConfig;
use sk_protocol::ipc::{
    ApiResponse, CreateTaskAck, CreateTaskRequest, IncompleteTask, RecoverAck, RecoverRequest,
    TaskCommand,
};
use sk_protocol::state_models::TaskId;
use std::time::Duration;
use tracing::debug;

use super::{sse, ControlChannel, EventChannel, RawEventStream, TransportError, TransportResult};

const START: &str = "/api/pipeline/start";
const PAUSE: &str = "/api/pipeline/pause";
const RESUME: &str = "/api/pipeline/resume";
const CANCEL: &str = "/api/pipeline/cancel";
const INCOMPLETE: &str = "/api/pipeline/incomplete";
const RECOVER: &str = "/api/pipeline/recover";
const STREAM: &str = "/api/pipeline/stream";

/// Engine reached over HTTP.
///
/// Control requests carry the configured timeout. The event stream has
/// none: a long pause between events is normal.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpEngine {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> TransportResult<Option<T>> {
        let response = request
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|source| TransportError::Http { endpoint, source })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Http { endpoint, source })?;
        debug!(endpoint, %status, "engine responded");

        // Error statuses usually still carry the envelope with a message.
        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TransportError::Rejected {
                    endpoint,
                    message: format!("HTTP {status}"),
                })
            }
            Err(source) => return Err(TransportError::InvalidResponse { endpoint, source }),
        };

        envelope
            .into_result()
            .map_err(|message| TransportError::Rejected { endpoint, message })
    }

    async fn command(&self, endpoint: &'static str, task_id: &TaskId) -> TransportResult<()> {
        let body = TaskCommand {
            task_id: task_id.clone(),
        };
        self.call::<Value>(endpoint, self.client.post(self.url(endpoint)).json(&body))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl ControlChannel for HttpEngine {
    async fn create(&self, request: &CreateTaskRequest) -> TransportResult<CreateTaskAck> {
        self.call(START, self.client.post(self.url(START)).json(request))
            .await?
            .ok_or(TransportError::MissingData { endpoint: START })
    }

    async fn pause(&self, task_id: &TaskId) -> TransportResult<()> {
        self.command(PAUSE, task_id).await
    }

    async fn resume(&self, task_id: &TaskId) -> TransportResult<()> {
        self.command(RESUME, task_id).await
    }

    async fn cancel(&self, task_id: &TaskId) -> TransportResult<()> {
        self.command(CANCEL, task_id).await
    }

    async fn list_incomplete(&self) -> TransportResult<Vec<IncompleteTask>> {
        let tasks = self
            .call(INCOMPLETE, self.client.get(self.url(INCOMPLETE)))
            .await?;
        Ok(tasks.unwrap_or_default())
    }

    async fn recover(&self, task_id: &TaskId, parallel: bool) -> TransportResult<RecoverAck> {
        let body = RecoverRequest {
            task_id: task_id.clone(),
            parallel,
        };
        self.call(RECOVER, self.client.post(self.url(RECOVER)).json(&body))
            .await?
            .ok_or(TransportError::MissingData { endpoint: RECOVER })
    }
}

#[async_trait]
impl EventChannel for HttpEngine {
    async fn open(&self, task_id: &TaskId) -> TransportResult<RawEventStream> {
        let response = self
            .client
            .get(self.url(STREAM))
            .query(&[("taskId", task_id.as_str())])
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|source| TransportError::Http {
                endpoint: STREAM,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected {
                endpoint: STREAM,
                message: format!("HTTP {status}"),
            });
        }

        debug!(%task_id, "event stream opened");
        Ok(sse::messages(response.bytes_stream()))
    }
}
