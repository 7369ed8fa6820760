use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use calcgrid_api::{
    ApiService, CalculateRequest, CalculateResponse, ExpressionEnvelope, ExpressionListResponse,
    OrchestratorApi, TaskEnvelope,
};
use calcgrid_core::types::TaskResult;

#[derive(Debug, Parser)]
#[command(name = "calcgrid-server")]
struct Args {
    #[arg(long, default_value = "config/calcgrid.yaml")]
    config: PathBuf,
    /// Overrides server.listen from the config file.
    #[arg(long)]
    listen: Option<SocketAddr>,
}

#[derive(Clone)]
struct AppState {
    api: Arc<OrchestratorApi>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = calcgrid_config::load_config_or_default(&args.config)
        .context("load configuration failed")?;
    init_tracing(&config.observability.log_level);

    let api = Arc::new(OrchestratorApi::from_config(&config));
    if let Some(ttl_ms) = config.dispatch.claim_timeout_ms {
        api.spawn_reclaimer(Duration::from_millis(ttl_ms));
    }

    let listen = match args.listen {
        Some(addr) => addr,
        None => config
            .server
            .listen
            .parse()
            .context("server.listen is not a valid socket address")?,
    };

    let state = AppState { api };
    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/calculate", post(calculate))
        .route("/api/v1/expressions", get(list_expressions))
        .route("/api/v1/expressions/{id}", get(get_expression))
        .route("/internal/task", get(fetch_task).post(submit_result))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .context("bind server listener failed")?;
    info!(%listen, "calcgrid-server listening");
    axum::serve(listener, app)
        .await
        .context("server terminated with error")
}

fn init_tracing(fallback_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status":"ok"}))
}

async fn calculate(
    State(state): State<AppState>,
    Json(payload): Json<CalculateRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let id = state
        .api
        .submit_expression(&payload.expression)
        .await
        .map_err(map_api_error)?;
    Ok((StatusCode::CREATED, Json(CalculateResponse { id })))
}

async fn list_expressions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let expressions = state
        .api
        .list_expressions()
        .await
        .map_err(map_api_error)?;
    Ok(Json(ExpressionListResponse { expressions }))
}

async fn get_expression(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let expression = state
        .api
        .get_expression(&id)
        .await
        .map_err(map_api_error)?;
    Ok(Json(ExpressionEnvelope { expression }))
}

async fn fetch_task(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let task = state.api.fetch_task().await.map_err(map_api_error)?;
    Ok(Json(TaskEnvelope { task }))
}

async fn submit_result(
    State(state): State<AppState>,
    Json(payload): Json<TaskResult>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    state
        .api
        .submit_result(&payload.id, payload.result)
        .await
        .map_err(map_api_error)?;
    Ok(StatusCode::OK)
}

fn map_api_error(err: calcgrid_api::ApiError) -> (StatusCode, Json<ErrorBody>) {
    let (status, code) = match err.code() {
        calcgrid_api::ErrorCode::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        calcgrid_api::ErrorCode::InvalidArgument => {
            (StatusCode::UNPROCESSABLE_ENTITY, "invalid_argument")
        }
        calcgrid_api::ErrorCode::Conflict => (StatusCode::CONFLICT, "conflict"),
        calcgrid_api::ErrorCode::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    };
    (
        status,
        Json(ErrorBody {
            code: code.to_string(),
            message: err.to_string(),
        }),
    )
}
