//! GridGuard Hub
//!
//! Telemetry ingestion and auto-protection server for power-grid zones.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      GRIDGUARD HUB                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐        ┌──────────────────────────────────┐  │
//! │  │  API      │ ─────▶ │  Decision Engine                 │  │
//! │  │  Gateway  │        │  (snapshots, isolation rule)     │  │
//! │  │  (Axum)   │        └────────┬────────────────┬────────┘  │
//! │  └───────────┘                 ▼                ▼           │
//! │                     ┌──────────────────┐ ┌─────────────┐    │
//! │                     │ Protection State │ │  Event Log  │    │
//! │                     │ autoProtect.json │ │  logs.json  │    │
//! │                     └──────────────────┘ └─────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod store;


use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

pub use config::Config;
pub use engine::DecisionEngine;
pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DecisionEngine>,
    pub config: Config,
}

impl AppState {
    pub fn new(engine: DecisionEngine, config: Config) -> Self {
        Self {
            engine: Arc::new(engine),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))

        // Telemetry (public)
        .route("/telemetry", post(handlers::telemetry::ingest).get(handlers::telemetry::list))

        // Protection (reads public, writes gated by ControlAccess)
        .route("/protect", get(handlers::protection::list).post(handlers::protection::set))
        .route("/simulate-break", post(handlers::protection::simulate_break))
        .route("/command", post(handlers::command::acknowledge))

        // Event log (public)
        .route("/logs", post(handlers::logs::append).get(handlers::logs::query))
        .route("/logs/summary", get(handlers::logs::summary))

        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
