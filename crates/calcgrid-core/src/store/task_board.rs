//! TaskBoard trait - pending-task queue and result correlation.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::StoreError;
use crate::types::{BinaryOp, Task, TaskId};

/// A task definition before the board has assigned it an id.
#[derive(Debug, Clone)]
pub struct TaskRequest {
    pub arg1: f64,
    pub arg2: f64,
    pub operation: BinaryOp,
    pub operation_time_ms: u64,
}

/// Handle returned by [`TaskBoard::submit`].
///
/// The receiver is a one-shot wired to `resolve` for the same task id, so a
/// waiting evaluator is woken exactly once and without polling. A dropped
/// sender (the board disappeared) surfaces as a receive error, which the
/// evaluator treats as a lost task.
#[derive(Debug)]
pub struct SubmittedTask {
    pub id: TaskId,
    pub result: oneshot::Receiver<f64>,
}

/// The correlation store linking task identity to its eventual result.
///
/// Tasks move Pending -> Claimed -> Resolved. Locks are held only for the
/// duration of a map operation, never across a suspension point, so many
/// evaluators and many agents make progress concurrently.
#[async_trait]
pub trait TaskBoard: Send + Sync {
    /// Allocate an id for the request, store it as pending, and return the
    /// one-shot the caller awaits for the computed value.
    async fn submit(&self, request: TaskRequest) -> Result<SubmittedTask, StoreError>;

    /// Remove and return the oldest pending task, marking it claimed.
    /// Returns `None` without blocking when nothing is pending. A claimed
    /// task is never handed out a second time while it stays claimed.
    async fn claim_next(&self) -> Result<Option<Task>, StoreError>;

    /// Deliver a computed value for a task.
    ///
    /// Unknown ids are rejected with `NotFound`; an already-resolved task is
    /// rejected with `Conflict`, so each result is consumed at most once.
    async fn resolve(&self, task_id: &str, value: f64) -> Result<(), StoreError>;

    /// Return claimed tasks older than `ttl` to the pending queue for
    /// redelivery. Returns how many were reclaimed.
    async fn reclaim_expired(&self, ttl: Duration) -> Result<usize, StoreError>;
}
