//! Bot command front end.
//!
//! Recognises `/start`: replies with a welcome text and immediately runs
//! the digest path for the invoking chat. Updates arrive either through the
//! webhook route (see `api::telegram`) or through [`run_update_polling`].

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;

use crate::calendar::format;
use crate::context::AppContext;
use crate::scheduler::digest_once;
use crate::services::telegram::{TelegramClient, Update};

/// Long-poll wait passed to `getUpdates`.
const LONG_POLL_SECS: u64 = 30;
const MAX_BACKOFF_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
}

/// Parse a bot command from message text. Accepts `/start` and
/// `/start@SomeBot`, followed by optional arguments.
pub fn parse_command(text: &str) -> Option<Command> {
    let word = text.split_whitespace().next()?;
    let name = word.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);
    match name.to_lowercase().as_str() {
        "start" => Some(Command::Start),
        _ => None,
    }
}

/// Handle one incoming update. Returns the command that was executed.
pub async fn handle_update(ctx: &AppContext, update: &Update) -> Option<Command> {
    let message = update.message.as_ref()?;
    let command = parse_command(message.text.as_deref()?)?;
    let chat_id = message.chat.id.to_string();

    match command {
        Command::Start => {
            tracing::info!("Received /start from chat {}", chat_id);
            ctx.metrics.start_commands_total.inc();

            let welcome = format::welcome_message(ctx.engine.lead_minutes());
            if let Err(err) = ctx.sink.send(&chat_id, &welcome).await {
                tracing::error!("Failed to reply to /start: {}", err);
                ctx.metrics.delivery_failures_total.inc();
            }

            digest_once(ctx, &chat_id).await;
        }
    }

    Some(command)
}

/// Receive updates by long polling until `shutdown` fires.
///
/// Errors back off exponentially with random jitter, capped at a minute.
pub async fn run_update_polling(
    client: Arc<TelegramClient>,
    ctx: Arc<AppContext>,
    mut shutdown: watch::Receiver<bool>,
) {
    if let Err(err) = client.delete_webhook().await {
        tracing::warn!("Could not clear webhook before polling: {}", err);
    }

    tracing::info!("Update polling started");
    let mut offset = 0i64;
    let mut failures = 0u32;

    loop {
        let result = tokio::select! {
            result = client.get_updates(offset, LONG_POLL_SECS) => result,
            _ = shutdown.changed() => break,
        };

        match result {
            Ok(updates) => {
                failures = 0;
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let ctx = ctx.clone();
                    tokio::spawn(async move {
                        handle_update(&ctx, &update).await;
                    });
                }
            }
            Err(err) => {
                failures = failures.saturating_add(1);
                let delay = backoff_delay(failures);
                tracing::error!("getUpdates failed (attempt {}): {}; retrying in {:?}", failures, err, delay);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown.changed() => break,
                }
            }
        }
    }

    tracing::info!("Update polling stopped cleanly");
}

/// Exponential backoff with up to 50% random jitter.
pub fn backoff_delay(failures: u32) -> Duration {
    let exp = failures.saturating_sub(1).min(6);
    let base = (1u64 << exp).min(MAX_BACKOFF_SECS);
    let jitter_ms = rand::thread_rng().gen_range(0..=base * 500);
    Duration::from_secs(base) + Duration::from_millis(jitter_ms)
}
