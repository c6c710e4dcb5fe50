//! Coordinates and the small amount of geometry the map needs
//!
//! This module handles:
//! - Latitude/longitude pairs with range validation
//! - Bounding boxes of paths (for fitting the viewport to a route)
//! - Human-readable distance formatting

use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a coordinate from a GeoJSON `[lon, lat]` position
    pub fn from_lon_lat([lng, lat]: [f64; 2]) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl Bounds {
    /// Smallest box containing every point of `path`
    ///
    /// Returns None for an empty path.
    pub fn of_path(path: &[Coordinate]) -> Option<Self> {
        let first = path.first()?;
        let mut bounds = Bounds {
            south_west: *first,
            north_east: *first,
        };
        for c in &path[1..] {
            bounds.south_west.lat = bounds.south_west.lat.min(c.lat);
            bounds.south_west.lng = bounds.south_west.lng.min(c.lng);
            bounds.north_east.lat = bounds.north_east.lat.max(c.lat);
            bounds.north_east.lng = bounds.north_east.lng.max(c.lng);
        }
        Some(bounds)
    }
}

/// Format a distance in meters as kilometers with two decimals
///
/// Rounds half away from zero on the hundredths digit, so 12345 m is
/// "12.35 km" regardless of how the division lands in binary.
pub fn format_km(meters: f64) -> String {
    let hundredths = (meters / 10.0).round() as i64;
    let sign = if hundredths < 0 { "-" } else { "" };
    let abs = hundredths.unsigned_abs();
    format!("{}{}.{:02} km", sign, abs / 100, abs % 100)
}
