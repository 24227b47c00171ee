//! HTTP routes.

use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use guide_chat::{ChatRequest, ChatResponse, ChatService};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(service: ChatService, request_timeout: Duration) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/health", get(health))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

async fn chat(
    State(service): State<ChatService>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;

    if request.message.trim().is_empty() {
        return Err(ApiError::Validation("message must not be empty".to_string()));
    }

    Ok(Json(service.handle(&request).await))
}

async fn health(State(service): State<ChatService>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "chunks": service.context().chunk_count(),
    }))
}
