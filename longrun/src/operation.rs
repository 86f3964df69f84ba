//! Polling of asynchronous operations until they reach a terminal status

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::common::OperationStatus;
use super::error::ApiError;
use super::Client;

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// Multiplier applied to the interval after every poll; 1 keeps it fixed.
    pub backoff_factor: u32,
    /// Overall bound on one wait; `None` polls until a terminal status.
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(3),
            max_interval: Duration::from_secs(30),
            backoff_factor: 2,
            timeout: Some(Duration::from_secs(60 * 60)),
        }
    }
}

impl PollConfig {
    fn next_interval(&self, current: Duration) -> Duration {
        std::cmp::min(
            current.saturating_mul(self.backoff_factor.max(1)),
            self.max_interval,
        )
    }
}

/// Status document served at an operation location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub status: OperationStatus,
}

pub struct OperationPoller {
    client: Client,
    config: PollConfig,
}

impl OperationPoller {
    pub fn new(client: Client, config: PollConfig) -> Self {
        Self { client, config }
    }

    /// Fetch the current status once.
    pub async fn query(&self, operation_url: &str) -> Result<Operation, ApiError> {
        self.client.get_absolute(operation_url).await
    }

    /// Poll `operation_url` until it reports Succeeded, Failed or Canceled.
    ///
    /// A Failed operation is returned as a status, not as an error.
    pub async fn wait_until_terminal(
        &self,
        operation_url: &str,
        cancel: &CancellationToken,
    ) -> Result<OperationStatus, ApiError> {
        let client = self.client.with_cancellation(cancel.clone());
        let started = Instant::now();
        let deadline = self.config.timeout.map(|timeout| started + timeout);
        let mut interval = self.config.initial_interval;
        let mut polls = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(ApiError::Canceled);
            }

            // The retry budget of a single poll must not outlive the deadline.
            let poll = client.get_absolute::<Operation>(operation_url);
            let operation = match deadline {
                Some(deadline) => tokio::select! {
                    result = poll => result?,
                    _ = tokio::time::sleep_until(deadline) => {
                        return Err(ApiError::PollTimeout(started.elapsed()));
                    }
                },
                None => poll.await?,
            };
            polls += 1;

            if operation.status.is_terminal() {
                tracing::info!(
                    "Operation {} reached {} after {} polls",
                    operation_url,
                    operation.status,
                    polls
                );
                return Ok(operation.status);
            }

            tracing::debug!(
                "Operation {} is {} (poll {}), next check in {:?}",
                operation_url,
                operation.status,
                polls,
                interval
            );

            let mut sleep_for = interval;
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return Err(ApiError::PollTimeout(now - started));
                }
                sleep_for = std::cmp::min(sleep_for, deadline - now);
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(ApiError::Canceled),
                _ = tokio::time::sleep(sleep_for) => {}
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(ApiError::PollTimeout(started.elapsed()));
                }
            }

            interval = self.config.next_interval(interval);
        }
    }
}
