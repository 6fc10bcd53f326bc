//! HTTP surface for the interview coaching engine.
//!
//! Exposes the turn endpoint plus the avatar signaling endpoints over axum.
//! Caller identity arrives as the `x-owner-id` header, injected by the
//! surrounding product's session middleware.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use avatar_stream::{StreamClient, StreamRegistry};
use coach_core::SlidingWindowLimiter;
use coach_database::Database;
use coach_engine::{EngineConfig, SessionEngine};
use mistral_brain::MistralBrain;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting coach API server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Completion backend
    let brain = Arc::new(MistralBrain::from_env()?);

    // One limiter shared by the engine and the stream endpoints, so every
    // endpoint class draws from the same per-owner windows.
    let limiter = Arc::new(SlidingWindowLimiter::new());

    // Turn engine
    let engine = SessionEngine::with_limiter(
        db,
        brain,
        limiter.clone(),
        EngineConfig::from_env(),
    );

    // Avatar streaming
    let streams = Arc::new(StreamRegistry::new(StreamClient::from_env()?));

    // Build application state
    let app_state = AppState::new(engine, streams, limiter);

    // Build router
    let app = routes::router().with_state(app_state);

    // Start server
    info!(addr = %config.addr, "Coach API listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
