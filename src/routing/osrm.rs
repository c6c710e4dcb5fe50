//! OSRM routing backend
//!
//! Queries the `route/v1/driving` service with full GeoJSON geometry.

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::routing::{RouteBackend, RouteResult};
use serde::Deserialize;
use tracing::{debug, warn};

/// Status code OSRM reports for a successful request
const OK_CODE: &str = "Ok";

/// OSRM routing backend
#[derive(Debug, Clone)]
pub struct OsrmBackend {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl OsrmBackend {
    /// Create a new OSRM backend against `base_url`
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the route URL; OSRM addresses waypoints as `lon,lat`
    pub fn route_url(&self, from: Coordinate, to: Coordinate) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, from.lng, from.lat, to.lng, to.lat
        )
    }

    fn into_route(response: OsrmResponse) -> Option<RouteResult> {
        if response.code != OK_CODE {
            warn!(
                "OSRM returned code {}: {}",
                response.code,
                response.message.as_deref().unwrap_or("no message")
            );
            return None;
        }

        let route = response.routes.into_iter().next()?;
        let path: Vec<Coordinate> = route
            .geometry
            .coordinates
            .into_iter()
            .map(Coordinate::from_lon_lat)
            .collect();

        if path.is_empty() {
            return None;
        }

        Some(RouteResult {
            path,
            distance_m: route.distance,
        })
    }
}

impl RouteBackend for OsrmBackend {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<Option<RouteResult>> {
        let url = self.route_url(from, to);
        debug!("OSRM lookup: {}", url);

        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Routing(format!("OSRM request failed: {}", e)))?;

        // OSRM answers 400 with a JSON body carrying the code (e.g. "NoRoute")
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Routing(format!("Failed to read OSRM response: {}", e)))?;

        let parsed: OsrmResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Routing(format!("Failed to parse OSRM response ({}): {}", status, e))
        })?;

        Ok(Self::into_route(parsed))
    }
}
