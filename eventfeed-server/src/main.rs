use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{info, warn};

use eventfeed_server::{AppState, cli::CliArgs, config::ServerConfig, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli_args = CliArgs::parse();

    // Set up logging
    let filter = match cli_args.log_level {
        Some(ref level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting eventfeed server v{}", eventfeed::VERSION);

    // Load configuration from CLI arguments and environment variables
    let server_config = ServerConfig::from_cli_and_env(cli_args)?;
    let engine_config = server_config.engine_config()?;
    let reindex_interval = engine_config.reindex.interval;
    info!(
        "Configuration loaded (feed strategy: {})",
        engine_config.ranking.strategy
    );

    let recommender = eventfeed::init(engine_config).await?;
    info!("Recommender initialized");

    let app_state = Arc::new(AppState::new(recommender, server_config.clone()));

    if !reindex_interval.is_zero() {
        spawn_reindex_loop(app_state.clone(), reindex_interval);
    }

    // Create the router with all API endpoints
    // Layers are applied innermost-first so each one sees an axum `Body`
    let app = create_router(app_state.clone())
        .layer(RequestBodyLimitLayer::new(server_config.max_request_size))
        .layer(ServiceBuilder::new().option_layer(server_config.enable_cors.then(CorsLayer::permissive)))
        .layer(TraceLayer::new_for_http());

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("API documentation available at http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    if let Err(e) = app_state.recommender.shutdown().await {
        warn!("Failed to flush storage on shutdown: {}", e);
    }

    Ok(())
}

/// Periodically backfill missing embeddings
fn spawn_reindex_loop(state: Arc<AppState>, every: Duration) {
    info!("Background reindex every {:?}", every);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match state.recommender.reindex().await {
                Ok(report) if report.events + report.users > 0 => info!(
                    "Background reindex wrote {} event and {} user embeddings",
                    report.events, report.users
                ),
                Ok(_) => {}
                Err(e) => warn!("Background reindex failed: {}", e),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
