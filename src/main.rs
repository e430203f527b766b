// Load configuration
// Set up logging
// Connect the record store and the cache store
// Create shared state
// Serve HTTP until Ctrl-C

use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transaction_cache_service::{
    api, cache, config::Config, db, state::AppState, SqliteRecordStore,
};

fn startup_backoff(retries: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(200))
        .with_max_times(retries)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting transaction-cache-service");

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    // Setup database connection
    let db_pool = (|| db::connection::establish_connection(&config.database_url, config.database_max_connections))
        .retry(startup_backoff(config.startup_retries))
        .notify(|e, after| warn!("Database not ready ({}), retrying in {:?}", e, after))
        .await?;

    // Initialize cache
    let cache_store = (|| cache::init_cache(&config))
        .retry(startup_backoff(config.startup_retries))
        .notify(|e, after| warn!("Cache store not ready ({}), retrying in {:?}", e, after))
        .await?;

    // Create shared state
    let app_state = Arc::new(AppState::new(
        config.cache_ttls,
        Arc::new(SqliteRecordStore::new(db_pool)),
        cache_store,
    ));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
        signal_token.cancel();
    });

    // Start HTTP server
    let app = api::create_router(app_state);
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Server stopped");
    Ok(())
}
