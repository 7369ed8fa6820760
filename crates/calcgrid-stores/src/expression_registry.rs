//! ExpressionRegistry in-memory implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use calcgrid_core::store::{ExpressionRegistry, StoreError};
use calcgrid_core::types::{Expression, ExpressionStatus};

/// In-memory registry. Identifiers are allocated from a counter guarded by
/// the same lock as the records, so they are strictly monotonic.
pub struct InMemoryExpressionRegistry {
    inner: RwLock<RegistryInner>,
}

struct RegistryInner {
    next_id: u64,
    expressions: HashMap<String, Expression>,
    // Insertion order for list snapshots.
    order: Vec<String>,
}

impl InMemoryExpressionRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                next_id: 0,
                expressions: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }
}

impl Default for InMemoryExpressionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExpressionRegistry for InMemoryExpressionRegistry {
    async fn create(&self, source: &str) -> Result<Expression, StoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        inner.next_id += 1;
        let id = inner.next_id.to_string();
        let expression = Expression::new(id.clone(), source);
        inner.expressions.insert(id.clone(), expression.clone());
        inner.order.push(id);
        Ok(expression)
    }

    async fn get(&self, id: &str) -> Result<Option<Expression>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(inner.expressions.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Expression>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.expressions.get(id).cloned())
            .collect())
    }

    async fn complete(&self, id: &str, result: f64) -> Result<(), StoreError> {
        self.transition(id, |expr| expr.complete(result))
    }

    async fn fail(&self, id: &str, reason: &str) -> Result<(), StoreError> {
        self.transition(id, |expr| expr.fail(reason))
    }
}

impl InMemoryExpressionRegistry {
    // Pending -> terminal happens at most once.
    fn transition(
        &self,
        id: &str,
        apply: impl FnOnce(&mut Expression),
    ) -> Result<(), StoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let expr = inner
            .expressions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if expr.status != ExpressionStatus::Pending {
            return Err(StoreError::Conflict(format!(
                "expression {id} already reached a terminal state"
            )));
        }
        apply(expr);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_and_list_keeps_insertion_order() {
        tokio_test::block_on(async {
            let registry = InMemoryExpressionRegistry::new();
            let a = registry.create("1+1").await.unwrap();
            let b = registry.create("2+2").await.unwrap();
            let c = registry.create("3+3").await.unwrap();
            assert_eq!(a.id, "1");
            assert_eq!(b.id, "2");
            assert_eq!(c.id, "3");

            let listed: Vec<String> = registry
                .list()
                .await
                .unwrap()
                .into_iter()
                .map(|e| e.id)
                .collect();
            assert_eq!(listed, vec!["1", "2", "3"]);
        });
    }

    #[test]
    fn test_get_is_idempotent() {
        tokio_test::block_on(async {
            let registry = InMemoryExpressionRegistry::new();
            let created = registry.create("2+2").await.unwrap();
            let first = registry.get(&created.id).await.unwrap().unwrap();
            let second = registry.get(&created.id).await.unwrap().unwrap();
            assert_eq!(first.id, second.id);
            assert_eq!(first.status, second.status);
            assert_eq!(first.result, second.result);
        });
    }

    #[test]
    fn test_get_unknown_returns_none() {
        tokio_test::block_on(async {
            let registry = InMemoryExpressionRegistry::new();
            assert!(registry.get("404").await.unwrap().is_none());
        });
    }

    #[test]
    fn test_complete_transitions_once() {
        tokio_test::block_on(async {
            let registry = InMemoryExpressionRegistry::new();
            let created = registry.create("2+2").await.unwrap();

            registry.complete(&created.id, 4.0).await.unwrap();
            let stored = registry.get(&created.id).await.unwrap().unwrap();
            assert_eq!(stored.status, ExpressionStatus::Completed);
            assert_eq!(stored.result, 4.0);

            // A second terminal transition is rejected.
            let err = registry.complete(&created.id, 5.0).await.unwrap_err();
            assert!(matches!(err, StoreError::Conflict(_)));
            let err = registry.fail(&created.id, "late").await.unwrap_err();
            assert!(matches!(err, StoreError::Conflict(_)));
        });
    }

    #[test]
    fn test_fail_records_reason() {
        tokio_test::block_on(async {
            let registry = InMemoryExpressionRegistry::new();
            let created = registry.create("2+").await.unwrap();
            registry
                .fail(&created.id, "not enough operands")
                .await
                .unwrap();
            let stored = registry.get(&created.id).await.unwrap().unwrap();
            assert!(matches!(stored.status, ExpressionStatus::Failed { .. }));
        });
    }
}
