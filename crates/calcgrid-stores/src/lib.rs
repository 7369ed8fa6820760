//! # Calcgrid Stores
//!
//! In-memory store implementations for the Calcgrid orchestrator.
//!
//! This crate provides:
//! - InMemory ExpressionRegistry
//! - InMemory TaskBoard

mod expression_registry;
mod task_board;

pub use expression_registry::InMemoryExpressionRegistry;
pub use task_board::InMemoryTaskBoard;

// Re-export core traits for convenience
pub use calcgrid_core::store::{
    ExpressionRegistry, StoreError, SubmittedTask, TaskBoard, TaskRequest,
};
