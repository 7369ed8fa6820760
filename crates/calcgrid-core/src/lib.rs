//! # Calcgrid Core
//!
//! Expression-decomposition and task-correlation engine.
//!
//! An infix arithmetic expression is tokenized, reordered into Reverse
//! Polish Notation, and walked by the evaluator, which emits one task per
//! operator application onto a task board and suspends until an agent
//! delivers the task's result. Store traits are defined here; in-memory
//! implementations live in the calcgrid-stores crate.

pub mod evaluator;
pub mod parser;
pub mod store;
pub mod types;

pub use evaluator::{EvalError, Evaluator, OperationTimes};
