//! Evaluator module
//!
//! The evaluator walks an expression's RPN form with a value stack,
//! synthesizes one task per operator application, and suspends on each
//! task's one-shot result channel until an agent delivers the value. Data
//! dependencies between operations are enforced by the walk itself: a task
//! is never created before both of its operands are resolved numbers.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::parser::{self, Token};
use crate::store::{ExpressionRegistry, StoreError, TaskBoard, TaskRequest};
use crate::types::{BinaryOp, TaskId};

/// Evaluation error types
#[derive(Debug, Error)]
pub enum EvalError {
    /// The RPN walk underflowed or did not reduce to a single value
    #[error("malformed expression: {0}")]
    MalformedExpression(String),

    /// A token is neither a valid number nor a known operator
    #[error("unresolvable operand '{0}'")]
    UnresolvableOperand(String),

    /// The result channel closed before a value arrived
    #[error("result for task {0} never arrived")]
    LostTask(TaskId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Per-operator artificial compute-cost hints in milliseconds.
/// Passed through to agents on each task, never interpreted by the core.
#[derive(Debug, Clone, Copy)]
pub struct OperationTimes {
    pub addition_ms: u64,
    pub subtraction_ms: u64,
    pub multiplication_ms: u64,
    pub division_ms: u64,
}

impl OperationTimes {
    fn for_op(&self, op: BinaryOp) -> u64 {
        match op {
            BinaryOp::Add => self.addition_ms,
            BinaryOp::Sub => self.subtraction_ms,
            BinaryOp::Mul => self.multiplication_ms,
            BinaryOp::Div => self.division_ms,
        }
    }
}

impl Default for OperationTimes {
    fn default() -> Self {
        Self {
            addition_ms: 1000,
            subtraction_ms: 1000,
            multiplication_ms: 2000,
            division_ms: 2000,
        }
    }
}

/// Evaluator - turns one expression into a sequence of dispatched tasks and
/// records the terminal outcome in the registry.
pub struct Evaluator {
    board: Arc<dyn TaskBoard>,
    registry: Arc<dyn ExpressionRegistry>,
    op_times: OperationTimes,
}

impl Evaluator {
    pub fn new(
        board: Arc<dyn TaskBoard>,
        registry: Arc<dyn ExpressionRegistry>,
        op_times: OperationTimes,
    ) -> Self {
        Self {
            board,
            registry,
            op_times,
        }
    }

    /// Run the full pipeline for one expression and record the outcome.
    ///
    /// Intended to be spawned as an independent background task per
    /// expression; one expression's failure never affects another.
    pub async fn run(&self, expression_id: &str, source: &str) {
        match self.evaluate(expression_id, source).await {
            Ok(value) => {
                info!(expression_id, value, "expression completed");
                if let Err(err) = self.registry.complete(expression_id, value).await {
                    error!(expression_id, error = %err, "failed to record completion");
                }
            }
            Err(err) => {
                error!(expression_id, error = %err, "expression evaluation failed");
                if let Err(store_err) = self.registry.fail(expression_id, &err.to_string()).await
                {
                    error!(expression_id, error = %store_err, "failed to record failure");
                }
            }
        }
    }

    /// Decompose the expression into tasks and compute its final value.
    pub async fn evaluate(&self, expression_id: &str, source: &str) -> Result<f64, EvalError> {
        let rpn = parser::to_postfix(parser::tokenize(source));
        let mut stack: Vec<f64> = Vec::new();

        for token in rpn {
            match token {
                Token::Number(text) => {
                    let value: f64 = text
                        .parse()
                        .map_err(|_| EvalError::UnresolvableOperand(text.clone()))?;
                    stack.push(value);
                }
                Token::Op(op) => {
                    // First popped is the right-hand operand, preserving
                    // operand order for subtraction and division.
                    let arg2 = stack.pop().ok_or_else(|| underflow(op))?;
                    let arg1 = stack.pop().ok_or_else(|| underflow(op))?;
                    let value = self.dispatch(expression_id, arg1, arg2, op).await?;
                    stack.push(value);
                }
                // Leftovers from tolerated unbalanced parentheses.
                Token::LeftParen | Token::RightParen => {}
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(value), true) => Ok(value),
            _ => Err(EvalError::MalformedExpression(
                "expression did not reduce to a single value".to_string(),
            )),
        }
    }

    /// Submit one binary operation and suspend until its result arrives.
    /// No store lock is held while waiting.
    async fn dispatch(
        &self,
        expression_id: &str,
        arg1: f64,
        arg2: f64,
        op: BinaryOp,
    ) -> Result<f64, EvalError> {
        let submitted = self
            .board
            .submit(TaskRequest {
                arg1,
                arg2,
                operation: op,
                operation_time_ms: self.op_times.for_op(op),
            })
            .await?;
        debug!(expression_id, task_id = %submitted.id, operation = %op, "task submitted");

        let value = submitted
            .result
            .await
            .map_err(|_| EvalError::LostTask(submitted.id.clone()))?;
        debug!(expression_id, task_id = %submitted.id, value, "task resolved");
        Ok(value)
    }
}

fn underflow(op: BinaryOp) -> EvalError {
    EvalError::MalformedExpression(format!("not enough operands for operator '{op}'"))
}
