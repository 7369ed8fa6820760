//! TaskBoard in-memory implementation.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

use calcgrid_core::store::{StoreError, SubmittedTask, TaskBoard, TaskRequest};
use calcgrid_core::types::{Task, TaskId};

/// In-memory correlation store.
///
/// A single mutex guards the queue and the entries; it is only ever held for
/// the duration of a map operation. The one-shot sender stored with each
/// entry is taken exactly once by `resolve`, which gives waiting evaluators
/// exactly-once wake-up without polling.
pub struct InMemoryTaskBoard {
    inner: Mutex<BoardInner>,
}

struct BoardInner {
    next_id: u64,
    // FIFO delivery order of pending task ids.
    queue: VecDeque<TaskId>,
    entries: HashMap<TaskId, TaskEntry>,
}

struct TaskEntry {
    task: Task,
    phase: TaskPhase,
    notify: Option<oneshot::Sender<f64>>,
}

enum TaskPhase {
    Pending,
    Claimed { claimed_at: Instant },
    Resolved,
}

impl InMemoryTaskBoard {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BoardInner {
                next_id: 0,
                queue: VecDeque::new(),
                entries: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BoardInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|e| StoreError::Internal(e.to_string()))
    }
}

impl Default for InMemoryTaskBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskBoard for InMemoryTaskBoard {
    async fn submit(&self, request: TaskRequest) -> Result<SubmittedTask, StoreError> {
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let id = inner.next_id.to_string();

        let (tx, rx) = oneshot::channel();
        inner.entries.insert(
            id.clone(),
            TaskEntry {
                task: Task {
                    id: id.clone(),
                    arg1: request.arg1,
                    arg2: request.arg2,
                    operation: request.operation,
                    operation_time_ms: request.operation_time_ms,
                },
                phase: TaskPhase::Pending,
                notify: Some(tx),
            },
        );
        inner.queue.push_back(id.clone());

        Ok(SubmittedTask { id, result: rx })
    }

    async fn claim_next(&self) -> Result<Option<Task>, StoreError> {
        let mut inner = self.lock()?;
        while let Some(id) = inner.queue.pop_front() {
            // Skip ids whose entry left the pending phase behind the
            // queue's back (e.g. resolved before ever being claimed).
            if let Some(entry) = inner.entries.get_mut(&id) {
                if matches!(entry.phase, TaskPhase::Pending) {
                    entry.phase = TaskPhase::Claimed {
                        claimed_at: Instant::now(),
                    };
                    return Ok(Some(entry.task.clone()));
                }
            }
        }
        Ok(None)
    }

    async fn resolve(&self, task_id: &str, value: f64) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let entry = inner
            .entries
            .get_mut(task_id)
            .ok_or_else(|| StoreError::NotFound(task_id.to_string()))?;

        if matches!(entry.phase, TaskPhase::Resolved) {
            return Err(StoreError::Conflict(format!(
                "task {task_id} already resolved"
            )));
        }

        entry.phase = TaskPhase::Resolved;
        if let Some(tx) = entry.notify.take() {
            // A dropped receiver means the waiting evaluator is gone; the
            // task still counts as resolved.
            let _ = tx.send(value);
        }
        Ok(())
    }

    async fn reclaim_expired(&self, ttl: Duration) -> Result<usize, StoreError> {
        let mut inner = self.lock()?;
        let now = Instant::now();
        let expired: Vec<TaskId> = inner
            .entries
            .iter()
            .filter_map(|(id, entry)| match entry.phase {
                TaskPhase::Claimed { claimed_at }
                    if now.duration_since(claimed_at) >= ttl =>
                {
                    Some(id.clone())
                }
                _ => None,
            })
            .collect();

        for id in &expired {
            if let Some(entry) = inner.entries.get_mut(id) {
                entry.phase = TaskPhase::Pending;
            }
            inner.queue.push_back(id.clone());
        }
        Ok(expired.len())
    }
}
