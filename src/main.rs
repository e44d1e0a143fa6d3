use std::sync::Arc;

use review_bot::channels::{TelegramNotifier, deliver};
use review_bot::config::{self, BotConfig};
use review_bot::logging::init_logging;
use review_bot::error::Result;
use review_bot::poller::{StatusPoller, shutdown_signal, spawn_status_poller};
use review_bot::practicum::PracticumClient;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty());
    let log_guard = init_logging(log_dir.as_deref());

    tracing::info!("Review bot v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Startup aborted: {e}");
            // Best effort: report the failure if enough of Telegram is configured.
            if let Some((target, api_url)) =
                config::partial_telegram_target(|key| std::env::var(key).ok())
            {
                let notifier = TelegramNotifier::new(
                    api_url,
                    target,
                    std::time::Duration::from_secs(config::DEFAULT_REQUEST_TIMEOUT_SECS),
                );
                deliver(&notifier, &format!("Ошибка программы: {e}")).await;
            }
            drop(log_guard);
            std::process::exit(1);
        }
    };

    let api = Arc::new(PracticumClient::from_config(&config));
    let notifier = Arc::new(TelegramNotifier::from_config(&config));
    let cursor = chrono::Utc::now().timestamp();

    let poller = StatusPoller::new(api, notifier, config.poll_interval, cursor);

    let stop_requested = shutdown_signal()?;
    let shutdown = CancellationToken::new();
    let handle = spawn_status_poller(poller, shutdown.clone());

    stop_requested.await;
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
    handle.await?;

    Ok(())
}
