use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::signal;
use tokio::sync::watch;

use econ_event_notifier::alerts::{LogSink, NotificationSink};
use econ_event_notifier::api::{create_router, ApiState};
use econ_event_notifier::bot::run_update_polling;
use econ_event_notifier::calendar::{CalendarEngine, EventNormalizer};
use econ_event_notifier::cli::Cli;
use econ_event_notifier::config::{Config, Transport};
use econ_event_notifier::context::AppContext;
use econ_event_notifier::error::AppError;
use econ_event_notifier::logging::init_logging;
use econ_event_notifier::metrics::AppMetrics;
use econ_event_notifier::scheduler::{digest_once, run_alert_polling, run_daily_digest};
use econ_event_notifier::services::investing::HttpFeedClient;
use econ_event_notifier::services::telegram::TelegramClient;

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();
    init_logging("info");

    if let Err(err) = run(cli).await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = Config::from_env().map_err(AppError::Config)?;
    config.apply_cli(&cli).map_err(AppError::Config)?;
    config.validate(cli.dry_run).map_err(AppError::Config)?;

    tracing::info!("Service started with config: {:?}", config);

    let feed = Arc::new(HttpFeedClient::investing(
        config.feed_url.clone(),
        config.fetch_timeout(),
    )?);
    tracing::info!("Calendar feed: {}", feed.url());
    let engine = Arc::new(CalendarEngine::new(
        feed,
        EventNormalizer::new(config.target_region.clone()),
        config.alert_config(),
        config.digest_config(),
    ));
    let metrics = Arc::new(AppMetrics::new()?);

    let telegram = match (&config.telegram_token, cli.dry_run) {
        (Some(token), false) => Some(Arc::new(TelegramClient::new(
            token.clone(),
            config.fetch_timeout(),
        )?)),
        _ => None,
    };
    let sink: Arc<dyn NotificationSink> = match &telegram {
        Some(client) => client.clone(),
        None => Arc::new(LogSink),
    };

    let ctx = Arc::new(AppContext {
        engine,
        sink,
        metrics,
        channel_id: config.channel_id.clone().unwrap_or_else(|| "dry-run".to_string()),
    });

    if cli.digest_now {
        digest_once(&ctx, &ctx.channel_id).await;
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = vec![
        tokio::spawn(run_alert_polling(
            ctx.clone(),
            config.poll_interval_seconds,
            shutdown_rx.clone(),
        )),
        tokio::spawn(run_daily_digest(
            ctx.clone(),
            config.digest_time,
            shutdown_rx.clone(),
        )),
    ];

    let mut webhook_token = None;
    if let Some(client) = &telegram {
        match config.transport {
            Transport::Polling => {
                tasks.push(tokio::spawn(run_update_polling(
                    client.clone(),
                    ctx.clone(),
                    shutdown_rx.clone(),
                )));
            }
            Transport::Webhook => {
                webhook_token = Some(client.token().to_string());
                match &config.webhook_url {
                    Some(base) => {
                        let url = format!("{}/telegram/{}", base.trim_end_matches('/'), client.token());
                        match client.set_webhook(&url).await {
                            Ok(()) => tracing::info!("Webhook registered at {}/telegram/<token>", base),
                            Err(err) => tracing::error!("Failed to register webhook: {}", err),
                        }
                    }
                    None => tracing::warn!(
                        "TRANSPORT=webhook without WEBHOOK_URL; assuming the webhook is registered externally"
                    ),
                }
            }
        }
    }

    let state = Arc::new(ApiState {
        ctx: ctx.clone(),
        webhook_token,
        transport: match config.transport {
            Transport::Webhook => "webhook",
            Transport::Polling => "polling",
        },
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    let mut server_shutdown = shutdown_rx.clone();
    let server = axum::serve(listener, create_router(state)).with_graceful_shutdown(async move {
        let _ = server_shutdown.changed().await;
    });
    let server_task = tokio::spawn(async move { server.await });

    signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received. Stopping.");
    let _ = shutdown_tx.send(true);

    for task in tasks {
        if let Err(err) = task.await {
            tracing::error!("Background task ended abnormally: {}", err);
        }
    }
    match server_task.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => tracing::error!("HTTP server error: {}", err),
        Err(err) => tracing::error!("HTTP server task ended abnormally: {}", err),
    }

    tracing::info!("Stopped cleanly");
    Ok(())
}
