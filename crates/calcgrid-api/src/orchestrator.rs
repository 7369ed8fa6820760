//! OrchestratorApi - the ApiService implementation owning the stores and
//! the evaluator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use calcgrid_config::CalcgridConfig;
use calcgrid_core::store::{ExpressionRegistry, TaskBoard};
use calcgrid_core::types::{Expression, Task};
use calcgrid_core::{Evaluator, OperationTimes};
use calcgrid_stores::{InMemoryExpressionRegistry, InMemoryTaskBoard};

use crate::{ApiError, ApiService};

pub struct OrchestratorApi {
    registry: Arc<dyn ExpressionRegistry>,
    board: Arc<dyn TaskBoard>,
    evaluator: Arc<Evaluator>,
}

impl OrchestratorApi {
    pub fn new(
        registry: Arc<dyn ExpressionRegistry>,
        board: Arc<dyn TaskBoard>,
        op_times: OperationTimes,
    ) -> Self {
        let evaluator = Arc::new(Evaluator::new(
            board.clone(),
            registry.clone(),
            op_times,
        ));
        Self {
            registry,
            board,
            evaluator,
        }
    }

    /// Wire up in-memory stores from a loaded config.
    pub fn from_config(config: &CalcgridConfig) -> Self {
        Self::new(
            Arc::new(InMemoryExpressionRegistry::new()),
            Arc::new(InMemoryTaskBoard::new()),
            OperationTimes {
                addition_ms: config.operations.addition_ms,
                subtraction_ms: config.operations.subtraction_ms,
                multiplication_ms: config.operations.multiplication_ms,
                division_ms: config.operations.division_ms,
            },
        )
    }

    /// Spawn the background loop returning timed-out claims to the queue.
    /// Closes the lost-task gap when an agent dies mid-computation.
    pub fn spawn_reclaimer(&self, claim_ttl: Duration) -> JoinHandle<()> {
        let board = self.board.clone();
        let period = (claim_ttl / 2).max(Duration::from_millis(100));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match board.reclaim_expired(claim_ttl).await {
                    Ok(0) => {}
                    Ok(reclaimed) => {
                        warn!(reclaimed, "returned expired task claims to the queue")
                    }
                    Err(err) => warn!(error = %err, "task reclaim pass failed"),
                }
            }
        })
    }
}

#[async_trait]
impl ApiService for OrchestratorApi {
    async fn submit_expression(&self, source: &str) -> Result<String, ApiError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(ApiError::InvalidArgument(
                "expression must not be empty".to_string(),
            ));
        }

        let expression = self.registry.create(source).await?;
        info!(expression_id = %expression.id, "expression accepted");

        // One independent evaluation task per expression; its failure is
        // recorded in the registry and never propagates here.
        let evaluator = self.evaluator.clone();
        let id = expression.id.clone();
        let text = expression.source.clone();
        tokio::spawn(async move {
            evaluator.run(&id, &text).await;
        });

        Ok(expression.id)
    }

    async fn get_expression(&self, id: &str) -> Result<Expression, ApiError> {
        self.registry
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("expression '{id}' not found")))
    }

    async fn list_expressions(&self) -> Result<Vec<Expression>, ApiError> {
        Ok(self.registry.list().await?)
    }

    async fn fetch_task(&self) -> Result<Task, ApiError> {
        self.board
            .claim_next()
            .await?
            .ok_or_else(|| ApiError::NotFound("no tasks available".to_string()))
    }

    async fn submit_result(&self, task_id: &str, value: f64) -> Result<(), ApiError> {
        self.board.resolve(task_id, value).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use calcgrid_core::types::ExpressionStatus;

    fn api() -> OrchestratorApi {
        OrchestratorApi::from_config(&CalcgridConfig::default())
    }

    /// Play the agent role inline until the expression settles.
    async fn drive_to_terminal(api: &OrchestratorApi, expression_id: &str) -> Expression {
        for _ in 0..10_000 {
            match api.fetch_task().await {
                Ok(task) => {
                    let value = task.operation.apply(task.arg1, task.arg2);
                    api.submit_result(&task.id, value).await.unwrap();
                }
                Err(_) => {
                    let expr = api.get_expression(expression_id).await.unwrap();
                    if expr.status.is_terminal() {
                        return expr;
                    }
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
            }
        }
        panic!("expression {expression_id} never settled");
    }

    #[test]
    fn test_submit_and_evaluate_end_to_end() {
        tokio_test::block_on(async {
            let api = api();
            let id = api.submit_expression("2+3*4").await.unwrap();

            let expr = drive_to_terminal(&api, &id).await;
            assert_eq!(expr.status, ExpressionStatus::Completed);
            assert_eq!(expr.result, 14.0);
        });
    }

    #[test]
    fn test_parenthesized_expression_end_to_end() {
        tokio_test::block_on(async {
            let api = api();
            let id = api
                .submit_expression("(5+2)*(1-8)/(1-77)")
                .await
                .unwrap();

            let expr = drive_to_terminal(&api, &id).await;
            assert_eq!(expr.status, ExpressionStatus::Completed);
            let want = (5.0 + 2.0) * (1.0 - 8.0) / (1.0 - 77.0);
            assert!((expr.result - want).abs() < 1e-9);
        });
    }

    #[test]
    fn test_malformed_expression_fails_without_creating_tasks() {
        tokio_test::block_on(async {
            let api = api();
            let id = api.submit_expression("2+").await.unwrap();

            let expr = drive_to_terminal(&api, &id).await;
            assert!(matches!(expr.status, ExpressionStatus::Failed { .. }));
            // Nothing was ever dispatched.
            assert_eq!(api.fetch_task().await.unwrap_err().code(), ErrorCode::NotFound);
        });
    }

    #[test]
    fn test_submit_rejects_empty_expression() {
        tokio_test::block_on(async {
            let api = api();
            let err = api.submit_expression("   ").await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidArgument);
        });
    }

    #[test]
    fn test_fetch_task_on_empty_board_returns_not_found() {
        tokio_test::block_on(async {
            let api = api();
            let err = api.fetch_task().await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::NotFound);
        });
    }

    #[test]
    fn test_result_for_unknown_task_is_rejected_with_no_side_effects() {
        tokio_test::block_on(async {
            let api = api();
            let id = api.submit_expression("2+3*4").await.unwrap();

            let err = api.submit_result("404", 1.0).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::NotFound);

            // The expression still settles to its correct value.
            let expr = drive_to_terminal(&api, &id).await;
            assert_eq!(expr.result, 14.0);
        });
    }

    #[test]
    fn test_duplicate_result_is_rejected() {
        tokio_test::block_on(async {
            let api = api();
            api.submit_expression("1+1").await.unwrap();

            // Wait for the evaluator to put the task on the board.
            let task = loop {
                match api.fetch_task().await {
                    Ok(task) => break task,
                    Err(_) => tokio::time::sleep(Duration::from_millis(1)).await,
                }
            };
            api.submit_result(&task.id, 2.0).await.unwrap();
            let err = api.submit_result(&task.id, 3.0).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::Conflict);
        });
    }

    #[test]
    fn test_expressions_list_tracks_all_submissions() {
        tokio_test::block_on(async {
            let api = api();
            let a = api.submit_expression("1+1").await.unwrap();
            let b = api.submit_expression("2+2").await.unwrap();

            drive_to_terminal(&api, &a).await;
            drive_to_terminal(&api, &b).await;

            let listed = api.list_expressions().await.unwrap();
            assert_eq!(listed.len(), 2);
            assert!(listed.iter().all(|e| e.status.is_terminal()));
        });
    }
}
