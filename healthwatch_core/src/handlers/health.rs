//! Service liveness and endpoint health status handlers

use crate::{
    error::{AppError, Result},
    handlers::routes::parse_endpoint_id,
    models::ApiResponse,
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{info, warn};

/// Liveness of this service, independent of any registered endpoint.
pub async fn handle_liveness(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.registry.backend();
    let endpoints = match state.registry.ping().await {
        Ok(()) => state.registry.count().await,
        Err(e) => Err(e),
    };

    match endpoints {
        Ok(endpoints) => Json(ApiResponse::success(serde_json::json!({
            "status": "OK",
            "message": "API is healthy",
            "endpoints": endpoints,
            "backend": backend,
            "version": state.version,
        })))
        .into_response(),
        Err(e) => {
            warn!(backend, error = %e, "registry unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::error(format!("Registry unavailable: {}", e))),
            )
                .into_response()
        }
    }
}

/// Runs one health check cycle over every registered endpoint.
pub async fn handle_status(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let snapshot = state.registry.snapshot().await?;
    info!(endpoints = snapshot.len(), "GET /api/status - running health check cycle");

    let report = state.orchestrator.check_all(snapshot).await;
    let message = format!(
        "{} healthy, {} unhealthy",
        report.healthy_count(),
        report.unhealthy_count()
    );

    Ok(Json(ApiResponse::success(report).with_message(message)))
}

/// Probes a single registered endpoint.
pub async fn handle_endpoint_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_endpoint_id(&id)?;

    let endpoint = state
        .registry
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Endpoint with id {} not found", id)))?;

    let outcome = state.orchestrator.check_one(endpoint.descriptor()).await;
    Ok(Json(ApiResponse::success(outcome)))
}
