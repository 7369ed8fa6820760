//! Worker loop: fetch one task, compute it, submit the result.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use calcgrid_api::TaskEnvelope;
use calcgrid_core::types::{Task, TaskResult};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    Status(reqwest::StatusCode),
}

/// HTTP client side of the pull-based dispatch contract.
pub struct Worker {
    client: reqwest::Client,
    task_url: String,
    poll_interval: Duration,
}

impl Worker {
    pub fn new(base_url: &str, poll_interval: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            task_url: format!("{}/internal/task", base_url.trim_end_matches('/')),
            poll_interval,
        })
    }

    /// Fetch-compute-submit forever. Transport errors are logged and
    /// retried after the poll interval; they never kill the worker.
    pub async fn run(&self, worker_id: usize) {
        info!(worker_id, "worker started");
        loop {
            let task = match self.fetch_task().await {
                Ok(Some(task)) => task,
                Ok(None) => {
                    tokio::time::sleep(self.poll_interval).await;
                    continue;
                }
                Err(err) => {
                    warn!(worker_id, error = %err, "failed to fetch task");
                    tokio::time::sleep(self.poll_interval).await;
                    continue;
                }
            };

            debug!(worker_id, task_id = %task.id, operation = %task.operation, "task received");
            let result = compute(&task).await;
            if let Err(err) = self.send_result(&task.id, result).await {
                warn!(worker_id, task_id = %task.id, error = %err, "failed to send result");
            }
        }
    }

    /// `None` means the board is empty right now.
    pub async fn fetch_task(&self) -> Result<Option<Task>, TransportError> {
        let response = self.client.get(&self.task_url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }
        let envelope: TaskEnvelope = response.json().await?;
        Ok(Some(envelope.task))
    }

    pub async fn send_result(&self, task_id: &str, result: f64) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.task_url)
            .json(&TaskResult {
                id: task_id.to_string(),
                result,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }
        Ok(())
    }
}

/// Apply the task's operator after sleeping its artificial compute cost.
pub async fn compute(task: &Task) -> f64 {
    tokio::time::sleep(Duration::from_millis(task.operation_time_ms)).await;
    task.operation.apply(task.arg1, task.arg2)
}
