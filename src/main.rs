//! Arena - Application Entry Point
//!
//! This is the main entry point for the Arena server.

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use arena::{
    catalog::ContestCatalog,
    config::{Config, LogFormat},
    db, handlers,
    judge::JudgeClient,
    services::PgResultWriter,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.rust_log));
    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting Arena server...");

    // Load contest definitions
    let catalog = ContestCatalog::load_dir(&config.catalog.contest_data)?;
    tracing::info!(
        contests = catalog.len(),
        path = %config.catalog.contest_data.display(),
        "Contest catalog loaded"
    );

    // Initialize database
    tracing::info!("Connecting to database...");
    let db_pool = db::init(&config.database).await?;

    let judge = JudgeClient::new(&config.judge)?;
    tracing::info!(url = %judge.url(), "Judge client ready");

    let writer = Arc::new(PgResultWriter::new(db_pool.clone()));
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Create application state
    let state = AppState::new(db_pool, judge, catalog, writer, config);
    let app = handlers::app(state);

    // Start the server
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
