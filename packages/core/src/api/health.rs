use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, header},
    response::IntoResponse,
    Json,
};

use super::ApiState;

/// `GET /health`: liveness plus a glimpse of today's alert state.
pub async fn health(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let alerted_today = state.ctx.engine.alerted_count().await;

    (
        [(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))],
        Json(serde_json::json!({
            "status": "ok",
            "transport": state.transport,
            "alerted_today": alerted_today,
        })),
    )
}
