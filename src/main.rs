//! GridGuard Hub server binary

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gridguard_hub::{create_router, AppState, Config, DecisionEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so RUST_LOG can live there too
    dotenvy::dotenv().ok();

    // Initialize logging (LOG_FORMAT=json for structured output)
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "gridguard_hub=debug,tower_http=debug".into()))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    // Load configuration
    let mut config = Config::from_env();
    config.resolve_protect_key();

    tracing::info!("GridGuard Hub starting...");
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("Log retention: {} days", config.log_retention_days);
    if config.is_production() && config.protect_api_key.is_none() {
        tracing::warn!("Running in production without PROTECT_API_KEY");
    }

    // Load durable state
    let engine = DecisionEngine::open(&config);
    tracing::info!("Protection state: {}", engine.protection().path().display());
    tracing::info!("Event log: {} ({} entries)", engine.logs().path().display(), engine.logs().len());
    let state = AppState::new(engine, config.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
