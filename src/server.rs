//! HTTP surface: `POST /assist` and `GET /health`.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::assist::Orchestrator;
use crate::error::AssistError;

impl IntoResponse for AssistError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AssistError::MissingPrompt => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Prompt is required."}),
            ),
            AssistError::InvalidBody(detail) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Invalid request body.", "detail": detail}),
            ),
            AssistError::Unconfigured(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "Model load failed", "detail": detail}),
            ),
            AssistError::InvocationFailed(_) | AssistError::Timeout(_) | AssistError::Aborted(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "Agent run failed", "detail": self.detail()}),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the router with permissive CORS.
pub fn assist_routes(orchestrator: Arc<Orchestrator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/assist", post(assist))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(orchestrator)
}

// ── Assist ──────────────────────────────────────────────────────────────

async fn assist(State(orchestrator): State<Arc<Orchestrator>>, body: Bytes) -> Response {
    match orchestrator.handle_body(&body).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => e.into_response(),
    }
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health(State(orchestrator): State<Arc<Orchestrator>>) -> impl IntoResponse {
    let load_error = orchestrator.load_error();
    let status = if load_error.is_some() { "error" } else { "ok" };
    let mut payload = json!({
        "status": status,
        "model": orchestrator.model(),
    });
    if let Some(detail) = load_error {
        payload["detail"] = json!(detail);
    }
    Json(payload)
}
