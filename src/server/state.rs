//! Server shared state
//!
//! Holds the controller and the position feed for the HTTP server.

use crate::config::Config;
use crate::controller::MapController;
use crate::geo::GeoBackend;
use crate::location::channel::ChannelSource;
use crate::routing::RouteBackend;
use std::sync::Arc;
use std::time::Instant;

/// Shared state for the HTTP server
pub struct AppState<G, R> {
    /// Configuration
    pub config: Config,

    /// The session's map controller
    pub controller: Arc<MapController<G, R>>,

    /// Positions posted by the browser
    pub gps: Arc<ChannelSource>,

    started: Instant,
}

impl<G, R> AppState<G, R>
where
    G: GeoBackend,
    R: RouteBackend,
{
    /// Create new application state
    pub fn new(config: Config, controller: Arc<MapController<G, R>>) -> Self {
        Self {
            config,
            controller,
            gps: Arc::new(ChannelSource::new()),
            started: Instant::now(),
        }
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
