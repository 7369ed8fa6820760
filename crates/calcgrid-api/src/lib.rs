//! # Calcgrid API
//!
//! Service surface of the orchestrator: the `ApiService` trait consumed by
//! transports, its `OrchestratorApi` implementation owning the stores and
//! evaluator, wire DTOs, and the transport-independent error taxonomy.

mod dto;
mod error;
mod orchestrator;
mod service;

pub use dto::{
    CalculateRequest, CalculateResponse, ExpressionEnvelope, ExpressionListResponse, TaskEnvelope,
};
pub use error::{ApiError, ErrorCode};
pub use orchestrator::OrchestratorApi;
pub use service::ApiService;
