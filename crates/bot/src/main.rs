mod dispatch;
mod telegram;
mod updates;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fetchbot_core::{
    load_config, load_config_from_env, validate_config, CatalogCache, Config, DeliveryRouter,
    Pipeline, SanitizedConfig, YtDlpExtractor,
};

use dispatch::Dispatcher;
use telegram::TelegramClient;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("fetchbot {}", VERSION);

    // Load configuration: file when present, environment alone otherwise
    let config_path = std::env::var("FETCHBOT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));
    let config: Config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No config file at {:?}, using environment", config_path);
        load_config_from_env().context("Failed to load config from environment")?
    };

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;
    info!(
        "Configuration loaded: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );

    // Make sure the work root exists up front
    tokio::fs::create_dir_all(&config.delivery.work_root)
        .await
        .with_context(|| format!("Failed to create work root {:?}", config.delivery.work_root))?;

    // Wire the collaborators
    let telegram = Arc::new(
        TelegramClient::new(&config.bot.token).context("Failed to create Telegram client")?,
    );
    let extractor = Arc::new(YtDlpExtractor::default());
    let chat_api: Arc<dyn fetchbot_core::ChatApi> = telegram.clone();
    let media_extractor: Arc<dyn fetchbot_core::MediaExtractor> = extractor.clone();
    let router = DeliveryRouter::new(
        Arc::clone(&chat_api),
        config.upload.clone(),
        config.delivery.direct_limit_bytes(),
    );
    let pipeline = Arc::new(
        Pipeline::new(
            Arc::clone(&media_extractor),
            Arc::clone(&chat_api),
            router,
            config.delivery.work_root.clone(),
        )
        .with_progress_interval(config.delivery.progress_interval()),
    );
    let cache = Arc::new(CatalogCache::new(config.delivery.catalog_ttl()));
    let dispatcher = Arc::new(Dispatcher::new(chat_api, media_extractor, pipeline, cache));

    info!("Starting long poll (timeout {}s)", config.bot.poll_timeout_secs);
    let mut offset: Option<i64> = None;
    loop {
        let batch = tokio::select! {
            batch = telegram.get_updates(offset, config.bot.poll_timeout_secs) => batch,
            _ = shutdown_signal() => {
                info!("Shutting down");
                return Ok(());
            }
        };

        let updates = match batch {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed: {}", e);
                tokio::time::sleep(std::time::Duration::from_secs(3)).await;
                continue;
            }
        };

        if let Some(next) = updates::next_offset(&updates) {
            offset = Some(next);
        }

        // Each update is handled on its own task so a long transfer never
        // blocks the poll loop.
        for update in updates {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                dispatcher.handle_update(update).await;
            });
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
