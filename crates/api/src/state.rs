//! Application state for the API server.

use std::sync::Arc;

use byline_agents::{build_crew, CrewConfig, Pipeline};
use byline_common::Result;

/// Shared application state: the assembled pipeline plus server metadata.
///
/// The pipeline is immutable after assembly, so concurrent requests share
/// it without locking.
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Assemble the crew from configuration. Fails fast on any missing
    /// credential or malformed role config.
    pub fn new(config: &CrewConfig) -> Result<Self> {
        let pipeline = build_crew(config)?;
        Ok(Self::with_pipeline(Arc::new(pipeline)))
    }

    /// Wrap an already-built pipeline. Used by tests and embedders.
    pub fn with_pipeline(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            start_time: std::time::Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
