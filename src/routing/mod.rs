//! Driving routes between two coordinates

pub mod osrm;

use crate::config::ServicesConfig;
use crate::coord::{format_km, Coordinate};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A driving route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Path in travel order
    pub path: Vec<Coordinate>,
    /// Total length in meters
    pub distance_m: f64,
}

impl RouteResult {
    /// Distance as shown to the user, e.g. "12.35 km"
    pub fn distance_label(&self) -> String {
        format_km(self.distance_m)
    }
}

/// Trait for routing backends
pub trait RouteBackend: Send + Sync + 'static {
    /// Compute a driving route from `from` to `to`
    ///
    /// Returns None when the service answers but has no usable route
    fn route(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> impl std::future::Future<Output = Result<Option<RouteResult>>> + Send;
}

/// Get the routing backend described by the service settings
pub fn get_router(services: &ServicesConfig) -> Result<osrm::OsrmBackend> {
    Ok(osrm::OsrmBackend::new(services.http_client()?, &services.osrm_url))
}
