//! Store module
//!
//! Storage abstractions shared by the evaluator and the dispatch surface:
//! - ExpressionRegistry: expression lifecycle records (async trait)
//! - TaskBoard: pending-task queue and result correlation (async trait)
//!
//! Note: In-memory implementations live in the calcgrid-stores crate.

mod expression_registry;
mod task_board;

pub use expression_registry::ExpressionRegistry;
pub use task_board::{SubmittedTask, TaskBoard, TaskRequest};

use thiserror::Error;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
