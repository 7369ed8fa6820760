//! Wire-visible request/response shapes shared by the server and the agent.

use serde::{Deserialize, Serialize};

use calcgrid_core::types::{Expression, Task};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateRequest {
    pub expression: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionEnvelope {
    pub expression: Expression,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionListResponse {
    pub expressions: Vec<Expression>,
}

/// Wrapper an agent receives from `GET /internal/task`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub task: Task,
}
