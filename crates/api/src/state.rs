//! Application state shared across handlers.

use std::sync::Arc;

use avatar_stream::StreamRegistry;
use coach_core::RateLimit;
use coach_engine::SessionEngine;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Turn orchestrator.
    pub engine: SessionEngine,
    /// Live avatar streams.
    pub streams: Arc<StreamRegistry>,
    /// Admission control for endpoints the engine does not cover.
    pub limiter: Arc<dyn RateLimit>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        engine: SessionEngine,
        streams: Arc<StreamRegistry>,
        limiter: Arc<dyn RateLimit>,
    ) -> Self {
        Self {
            engine,
            streams,
            limiter,
        }
    }
}
