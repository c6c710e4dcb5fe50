//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim search API. Only the best candidate is requested.

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::geo::{GeoBackend, PlaceResult};
use serde::Deserialize;
use tracing::debug;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimBackend {
    /// Create a new Nominatim backend against `base_url`
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the search URL for a query
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?format=json&q={}&limit=1",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    /// Parse lat/lng strings to a coordinate
    fn parse_coords(lat: &str, lng: &str) -> Result<Coordinate> {
        let lat: f64 = lat.parse().map_err(|_| {
            Error::Geocoding(format!("Invalid latitude: {}", lat))
        })?;
        let lng: f64 = lng.parse().map_err(|_| {
            Error::Geocoding(format!("Invalid longitude: {}", lng))
        })?;
        Ok(Coordinate::new(lat, lng))
    }

    /// Take the first candidate, if any
    fn first_place(results: Vec<NominatimResult>) -> Result<Option<PlaceResult>> {
        match results.into_iter().next() {
            Some(result) => Ok(Some(PlaceResult {
                coord: Self::parse_coords(&result.lat, &result.lon)?,
                display_name: result.display_name,
            })),
            None => Ok(None),
        }
    }
}

impl GeoBackend for NominatimBackend {
    async fn geocode(&self, query: &str) -> Result<Option<PlaceResult>> {
        let url = self.search_url(query);
        debug!("Nominatim lookup: {}", url);

        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        Self::first_place(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> NominatimBackend {
        NominatimBackend::new(reqwest::Client::new(), "https://nominatim.example.org/")
    }

    #[test]
    fn test_parse_coords() {
        let c = NominatimBackend::parse_coords("40.7128", "-74.0060").unwrap();
        assert!((c.lat - 40.7128).abs() < 0.0001);
        assert!((c.lng - (-74.0060)).abs() < 0.0001);
    }

    #[test]
    fn test_parse_coords_invalid() {
        assert!(NominatimBackend::parse_coords("invalid", "0").is_err());
        assert!(NominatimBackend::parse_coords("0", "invalid").is_err());
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = backend().search_url("new york & co");
        assert_eq!(
            url,
            "https://nominatim.example.org/search?format=json&q=new%20york%20%26%20co&limit=1"
        );
    }

    #[test]
    fn test_first_place() {
        let body = r#"[
            {"lat": "48.8566", "lon": "2.3522", "display_name": "Paris, France", "importance": 0.9},
            {"lat": "33.66", "lon": "-95.55", "display_name": "Paris, Texas"}
        ]"#;
        let results: Vec<NominatimResult> = serde_json::from_str(body).unwrap();
        let place = NominatimBackend::first_place(results).unwrap().unwrap();
        assert_eq!(place.display_name, "Paris, France");
        assert!((place.coord.lat - 48.8566).abs() < 1e-9);
    }

    #[test]
    fn test_first_place_empty_is_no_match() {
        let results: Vec<NominatimResult> = serde_json::from_str("[]").unwrap();
        assert!(NominatimBackend::first_place(results).unwrap().is_none());
    }
}
