use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};

use super::ApiState;
use crate::bot;
use crate::services::telegram::Update;

/// `POST /telegram/:token`: Telegram webhook delivery.
///
/// The path token must equal the bot token; anything else is a 404 so the
/// endpoint is not discoverable. The body is only decoded after that check.
/// The update is handled on its own task and acknowledged immediately,
/// because Telegram retries slow webhooks.
pub async fn webhook(
    State(state): State<Arc<ApiState>>,
    Path(token): Path<String>,
    body: Bytes,
) -> StatusCode {
    match state.webhook_token.as_deref() {
        Some(expected) if expected == token => {}
        _ => return StatusCode::NOT_FOUND,
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(err) => {
            tracing::warn!("Discarding malformed webhook update: {}", err);
            return StatusCode::BAD_REQUEST;
        }
    };

    let ctx = state.ctx.clone();
    tokio::spawn(async move {
        bot::handle_update(&ctx, &update).await;
    });

    StatusCode::OK
}
