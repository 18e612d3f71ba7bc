use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use animon_core::{
    build_http_client, load_settings, CursorStore, EpisodeMonitor, EpisodeSource, MonitorOutcome,
    NyaaLocator, QBittorrentClient, SanitizedSettings, TorrentClient,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    // A missing .env is fine; the environment may already be populated.
    dotenvy::dotenv().ok();
    init_logging();

    match run().await {
        Ok(MonitorOutcome::Completed {
            episode,
            next_episode,
        }) => {
            info!(episode, next_episode, "Episode submitted, exiting");
        }
        Ok(MonitorOutcome::Cancelled { episode }) => {
            info!(episode, "Stopped before episode was submitted");
        }
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// `RUST_LOG` wins, then `LOG_LEVEL`, then `info`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            std::env::var("LOG_LEVEL")
                .map_err(|e| e.to_string())
                .and_then(|level| EnvFilter::try_new(level).map_err(|e| e.to_string()))
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run() -> Result<MonitorOutcome> {
    info!(version = VERSION, "Starting animon");

    let settings = load_settings().context("Failed to load configuration")?;
    match serde_json::to_string(&SanitizedSettings::from(&settings)) {
        Ok(sanitized) => info!(settings = %sanitized, "Configuration loaded"),
        Err(_) => info!("Configuration loaded"),
    }

    let http = build_http_client(Duration::from_secs(settings.http_timeout_secs))
        .context("Failed to build HTTP client")?;

    let source: Arc<dyn EpisodeSource> =
        Arc::new(NyaaLocator::new(http.clone(), settings.locator.clone()));
    info!(search_url = %settings.locator.search_url, "Episode locator: {}", source.name());

    let client: Arc<dyn TorrentClient> =
        Arc::new(QBittorrentClient::new(http, settings.qbittorrent.clone()));
    info!(url = %settings.qbittorrent.url, "Torrent client: {}", client.name());

    let cursor = CursorStore::new(settings.cursor_file.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let monitor = EpisodeMonitor::new(settings.monitor.clone(), source, client, cursor)
        .with_shutdown(shutdown_rx);

    Ok(monitor.run().await)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
