use async_trait::async_trait;

use calcgrid_core::types::{Expression, Task};

use crate::ApiError;

/// Boundary operations of the core, independent of wire format.
///
/// The last two methods are the pull-based dispatch contract agents use:
/// fetch one task, submit one result.
#[async_trait]
pub trait ApiService: Send + Sync {
    /// Create a pending expression and start evaluating it in the
    /// background. Returns the new expression's id immediately.
    async fn submit_expression(&self, source: &str) -> Result<String, ApiError>;

    async fn get_expression(&self, id: &str) -> Result<Expression, ApiError>;

    async fn list_expressions(&self) -> Result<Vec<Expression>, ApiError>;

    /// Claim the next pending task for an agent. `NotFound` when the board
    /// is empty; never blocks.
    async fn fetch_task(&self) -> Result<Task, ApiError>;

    /// Deliver an agent's computed value. `NotFound` for unknown task ids,
    /// `Conflict` for duplicates.
    async fn submit_result(&self, task_id: &str, value: f64) -> Result<(), ApiError>;
}
