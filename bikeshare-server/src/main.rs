use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use bikeshare_server::config::ServerConfig;
use bikeshare_server::gbfs::GbfsClient;
use bikeshare_server::refresh::{Refresher, spawn_schedule};
use bikeshare_server::snapshot::SnapshotCache;
use bikeshare_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ServerConfig::from_env().expect("Invalid configuration");
    info!(
        feeds = %config.gbfs.base_url,
        refresh_secs = config.refresh_interval.as_secs(),
        "Starting bike-share server"
    );

    // Create GBFS client
    let client = GbfsClient::new(config.gbfs.clone()).expect("Failed to create GBFS client");

    let cache = Arc::new(SnapshotCache::new());
    let refresher = Arc::new(Refresher::new(client, cache.clone()));

    // Initial refresh before serving; on failure we still start with an empty snapshot
    info!("Fetching initial snapshot...");
    match refresher.refresh().await {
        Ok(outcome) => info!(?outcome, "Initial snapshot ready"),
        Err(e) => warn!(
            error = %e,
            "Initial refresh failed, serving an empty snapshot until the next cycle"
        ),
    }

    let schedule = spawn_schedule(refresher, config.refresh_interval);

    // Build app state and router
    let state = AppState::new(cache);
    let app = create_router(state, &config.allowed_origins);

    // Bind and serve
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    info!("Listening on http://{addr}");
    info!("  GET  /api/v1/stations  - Stations as GeoJSON");
    info!("  GET  /api/v1/health    - Health check");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
    }

    schedule.shutdown().await;
    info!("Shut down");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bikeshare_server=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
