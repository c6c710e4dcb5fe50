//! Geocoding module
//!
//! Provides geocoding (place name to coordinates).

pub mod nominatim;

use crate::config::ServicesConfig;
use crate::coord::Coordinate;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A geocoded place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    /// Location of the best match
    pub coord: Coordinate,
    /// Display name (address or description)
    pub display_name: String,
}

/// Trait for geocoding backends
pub trait GeoBackend: Send + Sync + 'static {
    /// Geocode a free-text query to coordinates
    ///
    /// Returns the best match for the query, or None if not found
    fn geocode(&self, query: &str) -> impl std::future::Future<Output = Result<Option<PlaceResult>>> + Send;
}

/// Get the geocoding backend described by the service settings
pub fn get_geocoder(services: &ServicesConfig) -> Result<nominatim::NominatimBackend> {
    Ok(nominatim::NominatimBackend::new(
        services.http_client()?,
        &services.nominatim_url,
    ))
}
