//! Waitlist backends
//!
//! The flow only knows [`WaitlistBackend`]. [`WebhookBackend`] posts the
//! record as JSON to a configured endpoint; [`RecordingBackend`] keeps
//! records in memory for demos and tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{SubmitError, SubmitResult, WaitlistRecord};

/// Where waitlist records are delivered
#[async_trait]
pub trait WaitlistBackend: Send + Sync {
    /// Deliver one record. Exactly one attempt; no retries.
    async fn submit(&self, record: &WaitlistRecord) -> SubmitResult<()>;
}

/// Webhook configuration
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    /// Absolute URL records are POSTed to
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
    /// Treat a non-2xx status as a failure. Fire-and-forget endpoints
    /// (opaque form hooks) answer with statuses that carry no meaning.
    pub require_success_status: bool,
}

impl WebhookConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        WebhookConfig {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(10),
            require_success_status: true,
        }
    }
}

/// POSTs records as JSON to a webhook
#[derive(Clone, Debug)]
pub struct WebhookBackend {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookBackend {
    pub fn new(config: WebhookConfig) -> SubmitResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        Ok(WebhookBackend { config, client })
    }

    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }
}

#[async_trait]
impl WaitlistBackend for WebhookBackend {
    async fn submit(&self, record: &WaitlistRecord) -> SubmitResult<()> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(record)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = response.status();
        tracing::debug!(endpoint = %self.config.endpoint, %status, "waitlist webhook answered");
        if self.config.require_success_status && !status.is_success() {
            return Err(SubmitError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

/// Keeps delivered records in memory
#[derive(Debug, Default)]
pub struct RecordingBackend {
    records: Mutex<Vec<WaitlistRecord>>,
    failures_left: AtomicU32,
    failure: Mutex<Option<SubmitError>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` submissions with `error`
    pub fn failing(times: u32, error: SubmitError) -> Self {
        RecordingBackend {
            records: Mutex::new(Vec::new()),
            failures_left: AtomicU32::new(times),
            failure: Mutex::new(Some(error)),
        }
    }

    pub fn records(&self) -> Vec<WaitlistRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl WaitlistBackend for RecordingBackend {
    async fn submit(&self, record: &WaitlistRecord) -> SubmitResult<()> {
        let injected = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            let error = self
                .failure
                .lock()
                .clone()
                .unwrap_or_else(|| SubmitError::Transport("injected failure".into()));
            return Err(error);
        }

        self.records.lock().push(record.clone());
        Ok(())
    }
}
