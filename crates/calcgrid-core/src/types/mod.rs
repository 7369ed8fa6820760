//! Core type definitions for Calcgrid
//!
//! This module contains the fundamental types used throughout the system:
//! - Expression: client-visible calculation record with lifecycle state
//! - Task: atomic binary operation dispatched to an agent
//! - TaskResult: computed value correlated back by task id

mod expression;
mod task;

pub use expression::{Expression, ExpressionId, ExpressionStatus};
pub use task::{BinaryOp, Task, TaskId, TaskResult};
