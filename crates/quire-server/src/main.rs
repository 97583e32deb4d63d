//! Entry point for the quire-server binary.

use std::time::Duration;

use quire_server::{AppState, build_app, config::ServerConfig};
use quire_store::{RenderCache, Store, StoreConfig, cache::DEFAULT_MAX_AGE_SECS};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired renders are dropped from the cache.
const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = ServerConfig::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    tracing::info!("Starting quire-server");
    tracing::info!(
        host = %config.host,
        port = config.port,
        content = %config.content_path.display(),
        storage = %config.db_path.display(),
        media = %config.media_path.display(),
        "Configuration loaded"
    );

    // Open content and storage directories
    let store_config = StoreConfig::new(&config.content_path, &config.db_path)
        .with_read_attempts(config.file_read_attempts)
        .with_cache(
            config.render_cache_capacity,
            Duration::from_secs(DEFAULT_MAX_AGE_SECS),
        );
    let store = Store::open(store_config).await?;
    tracing::info!(entries = store.content().len().await, "Content loaded");

    spawn_cache_sweeper(store.cache().clone());

    // Build application
    let state = AppState::new(store, config.clone());
    let broadcaster = state.broadcaster().clone();
    let app = build_app(state);

    // Create listener
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    // Run server with graceful shutdown; open websockets are closed first so
    // the drain does not wait on them.
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            broadcaster.shutdown().await;
        })
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over `LOG_LEVEL` when both are set.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn spawn_cache_sweeper(cache: RenderCache) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_SWEEP_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            let evicted = cache.evict_expired();
            if evicted > 0 {
                tracing::debug!(evicted, "Swept expired renders");
            }
        }
    });
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
