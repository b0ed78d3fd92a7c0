//! Route table and endpoint registry handlers

use crate::{
    error::{AppError, Result},
    extractors::ValidatedJson,
    handlers::{dashboard, health},
    models::{ApiResponse, EndpointId, EndpointRequest, EndpointResponse},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::info;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::handle_dashboard))
        .route("/api/health", get(health::handle_liveness))
        .route("/api/status", get(health::handle_status))
        .route("/api/status/:id", get(health::handle_endpoint_status))
        .route(
            "/api/endpoints",
            get(handle_list_endpoints).post(handle_create_endpoint),
        )
        .route(
            "/api/endpoints/:id",
            get(handle_get_endpoint)
                .put(handle_update_endpoint)
                .delete(handle_delete_endpoint),
        )
}

/// Parses a path segment as an endpoint id.
pub(crate) fn parse_endpoint_id(raw: &str) -> Result<EndpointId> {
    EndpointId::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid endpoint ID: {}", raw)))
}

async fn handle_list_endpoints(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let endpoints = state.registry.list().await?;
    let body: Vec<EndpointResponse> = endpoints.iter().map(EndpointResponse::from).collect();

    Ok(Json(ApiResponse::success(body)))
}

async fn handle_get_endpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_endpoint_id(&id)?;

    let endpoint = state
        .registry
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Endpoint with id {} not found", id)))?;

    Ok(Json(ApiResponse::success(EndpointResponse::from(&endpoint))))
}

async fn handle_create_endpoint(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EndpointRequest>,
) -> Result<impl IntoResponse> {
    let endpoint = state.registry.create(payload.into_input()).await?;
    info!(endpoint_id = %endpoint.id, url = %endpoint.url, "endpoint registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(EndpointResponse::from(&endpoint))),
    ))
}

async fn handle_update_endpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<EndpointRequest>,
) -> Result<impl IntoResponse> {
    let id = parse_endpoint_id(&id)?;

    let endpoint = state.registry.update(id, payload.into_input()).await?;
    info!(endpoint_id = %endpoint.id, url = %endpoint.url, "endpoint updated");

    Ok(Json(ApiResponse::success(EndpointResponse::from(&endpoint))))
}

async fn handle_delete_endpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_endpoint_id(&id)?;

    state.registry.delete(id).await?;
    info!(endpoint_id = %id, "endpoint removed");

    Ok(StatusCode::NO_CONTENT)
}
