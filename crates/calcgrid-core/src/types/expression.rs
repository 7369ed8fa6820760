//! Expression type definitions
//!
//! Expression is the client-visible record tracking one submitted
//! calculation through its lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type alias for Expression ID
pub type ExpressionId = String;

/// Expression lifecycle states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExpressionStatus {
    /// Submitted, evaluation not yet finished
    Pending,
    /// Evaluation finished with a result
    Completed,
    /// Evaluation aborted
    Failed {
        /// Reason for failure
        reason: String,
    },
}

impl ExpressionStatus {
    /// Check if the expression reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExpressionStatus::Completed | ExpressionStatus::Failed { .. })
    }
}

/// Expression - one submitted calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    /// Unique identifier, monotonically increasing
    pub id: ExpressionId,
    /// Original expression text as submitted
    #[serde(rename = "expression")]
    pub source: String,
    /// Current lifecycle state
    #[serde(flatten)]
    pub status: ExpressionStatus,
    /// Computed value; zero until completed
    pub result: f64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Expression {
    /// Create a new pending expression
    pub fn new(id: impl Into<ExpressionId>, source: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            source: source.into(),
            status: ExpressionStatus::Pending,
            result: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition to completed with the final value
    pub fn complete(&mut self, result: f64) {
        self.status = ExpressionStatus::Completed;
        self.result = result;
        self.updated_at = Utc::now();
    }

    /// Transition to failed
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = ExpressionStatus::Failed {
            reason: reason.into(),
        };
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_expression_is_pending_with_zero_result() {
        let expr = Expression::new("1", "2+2");
        assert_eq!(expr.status, ExpressionStatus::Pending);
        assert_eq!(expr.result, 0.0);
        assert!(!expr.status.is_terminal());
    }

    #[test]
    fn test_complete_sets_result_and_terminal_state() {
        let mut expr = Expression::new("1", "2+2");
        expr.complete(4.0);
        assert_eq!(expr.status, ExpressionStatus::Completed);
        assert_eq!(expr.result, 4.0);
        assert!(expr.status.is_terminal());
    }

    #[test]
    fn test_fail_records_reason() {
        let mut expr = Expression::new("1", "2+");
        expr.fail("not enough operands");
        assert!(matches!(
            expr.status,
            ExpressionStatus::Failed { ref reason } if reason == "not enough operands"
        ));
        assert!(expr.status.is_terminal());
    }

    #[test]
    fn test_wire_shape_flattens_status() {
        let mut expr = Expression::new("7", "1+1");
        expr.complete(2.0);
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["expression"], "1+1");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["result"], 2.0);
    }
}
