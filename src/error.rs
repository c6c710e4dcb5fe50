//! Error types for mapnav

use thiserror::Error;

/// Main error type for mapnav operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Routing error: {0}")]
    Routing(String),

    #[error("Geolocation error: {0}")]
    Geolocation(String),

    #[error("Geolocation not supported")]
    GeolocationUnsupported,
}

/// Result type alias for mapnav operations
pub type Result<T> = std::result::Result<T, Error>;
