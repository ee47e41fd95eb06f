// HTTP request handlers
use crate::domain::insights::iso_timestamp;
use crate::infrastructure::http_response::json_response;
use crate::presentation::app_state::AppState;
use crate::presentation::endpoint::{handle_generate_insights, handle_unreadable_body};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::Method,
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub gemini_configured: bool,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/generate-insights", any(generate_insights))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: iso_timestamp(chrono::Utc::now()),
        gemini_configured: state.insights_service.is_configured(),
    })
}

/// Generate insights; every method is routed here so the shared handler can
/// answer OPTIONS and 405 with the JSON contract.
pub async fn generate_insights(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    let response = match body {
        Ok(body) => handle_generate_insights(&state.insights_service, &method, &body).await,
        Err(rejection) => handle_unreadable_body(&method, rejection.body_text()),
    };

    match json_response(response.status, &response.headers(), response.body_string()) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
