//! HTTP surface: health, metrics and the Telegram webhook.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use crate::context::AppContext;

pub mod health;
pub mod telegram;

/// Shared state for all routes.
pub struct ApiState {
    pub ctx: Arc<AppContext>,
    /// Bot token expected in the webhook path; `None` disables the webhook.
    pub webhook_token: Option<String>,
    pub transport: &'static str,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(metrics))
        .route("/telegram/:token", post(telegram::webhook))
        .with_state(state)
}

/// `GET /metrics`: Prometheus text exposition.
async fn metrics(State(state): State<Arc<ApiState>>) -> Response {
    match state.ctx.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Failed to render metrics: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics error").into_response()
        }
    }
}
