//! Task type definitions
//!
//! A Task is one atomic binary-operator application with fully resolved
//! numeric operands, ready to be computed by a remote agent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type alias for Task ID
pub type TaskId = String;

/// The four supported binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl BinaryOp {
    /// Operator precedence used by the infix-to-postfix converter.
    /// `*` and `/` bind tighter than `+` and `-`.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }

    /// Apply the operator to resolved operands.
    /// Division follows IEEE 754, so dividing by zero yields an infinity.
    pub fn apply(&self, arg1: f64, arg2: f64) -> f64 {
        match self {
            BinaryOp::Add => arg1 + arg2,
            BinaryOp::Sub => arg1 - arg2,
            BinaryOp::Mul => arg1 * arg2,
            BinaryOp::Div => arg1 / arg2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BinaryOp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(BinaryOp::Add),
            "-" => Ok(BinaryOp::Sub),
            "*" => Ok(BinaryOp::Mul),
            "/" => Ok(BinaryOp::Div),
            _ => Err(()),
        }
    }
}

/// Task - one dispatchable binary operation.
/// Immutable once created; operands are always resolved numbers because the
/// evaluator never emits a task before both inputs are known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for this task
    pub id: TaskId,
    /// Left-hand operand
    pub arg1: f64,
    /// Right-hand operand
    pub arg2: f64,
    /// Operator to apply
    pub operation: BinaryOp,
    /// Artificial compute cost in milliseconds, opaque to the core
    #[serde(rename = "operation_time")]
    pub operation_time_ms: u64,
}

/// Result of a computed task, submitted by an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// ID of the task this result belongs to
    pub id: TaskId,
    /// Computed value
    pub result: f64,
}
