//! ExpressionRegistry trait - expression lifecycle persistence.

use async_trait::async_trait;

use super::StoreError;
use crate::types::Expression;

/// Registry of submitted expressions.
///
/// Identifiers are allocated monotonically under the registry's exclusive
/// lock. Records are never deleted; each transitions Pending to a terminal
/// state at most once, and only the evaluator performs that transition.
#[async_trait]
pub trait ExpressionRegistry: Send + Sync {
    /// Allocate the next id and store a new pending record.
    async fn create(&self, source: &str) -> Result<Expression, StoreError>;

    /// Look up one expression by id.
    async fn get(&self, id: &str) -> Result<Option<Expression>, StoreError>;

    /// Snapshot of all expressions in insertion order.
    async fn list(&self) -> Result<Vec<Expression>, StoreError>;

    /// Transition an expression to Completed with its final value.
    async fn complete(&self, id: &str, result: f64) -> Result<(), StoreError>;

    /// Transition an expression to Failed with a reason.
    async fn fail(&self, id: &str, reason: &str) -> Result<(), StoreError>;
}
