//! Bounty overlay indexer — entry point.
//!
//! Serves the three protocols of the tracker over one Axum app: admission
//! of candidate transactions, lifecycle callbacks from the overlay delivery
//! layer, and lookups against the projected index in SQLite.

mod api;
mod config;
mod db;
mod errors;
mod projection;
mod query;
mod records;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use bounty_protocol::SigVerifier;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use projection::Projection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    // Load config from environment.
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url).await?;

    let state = Arc::new(api::ApiState {
        pool: pool.clone(),
        projection: Projection::new(pool, config.topic.clone()),
        verifier: SigVerifier::new(),
    });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/admit", post(api::admit_transaction))
        .route("/events/output-added", post(api::output_added))
        .route("/events/output-spent", post(api::output_spent))
        .route("/events/output-removed", post(api::output_removed))
        .route("/lookup", post(api::lookup))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr} (topic: {})", config.topic);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
