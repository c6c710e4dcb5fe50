//! Position sources
//!
//! A position source delivers a continuous stream of GPS fixes or errors,
//! mirroring the browser's `watchPosition` contract.

pub mod channel;
pub mod ip;

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

/// Capacity of the event channel handed to subscribers
pub const EVENT_BUFFER: usize = 32;

/// Subscription options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    /// Ask for the most precise fix the source can produce
    pub high_accuracy: bool,
    /// Maximum wait for the next event before it counts as a timeout
    pub timeout: Duration,
    /// Oldest previously acquired fix a source may hand out (zero = never replay)
    pub maximum_age: Duration,
}

/// A single fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coord: Coordinate,
    /// Horizontal accuracy radius in meters
    pub accuracy_m: f64,
    pub timestamp: DateTime<Utc>,
}

impl Position {
    /// A fix taken now
    pub fn now(coord: Coordinate, accuracy_m: f64) -> Self {
        Self {
            coord,
            accuracy_m,
            timestamp: Utc::now(),
        }
    }

    /// Whether this fix may still be handed out under `maximum_age`
    pub fn is_fresh(&self, maximum_age: Duration) -> bool {
        if maximum_age.is_zero() {
            return false;
        }
        let age = Utc::now().signed_duration_since(self.timestamp);
        age.to_std().map(|age| age <= maximum_age).unwrap_or(true)
    }
}

/// Why a fix could not be produced (browser error codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl PositionError {
    /// Numeric code as used by `GeolocationPositionError`
    pub fn code(&self) -> u16 {
        match self {
            Self::PermissionDenied => 1,
            Self::PositionUnavailable => 2,
            Self::Timeout => 3,
        }
    }

    /// Parse a numeric error code
    pub fn from_code(code: u16) -> Result<Self> {
        match code {
            1 => Ok(Self::PermissionDenied),
            2 => Ok(Self::PositionUnavailable),
            3 => Ok(Self::Timeout),
            _ => Err(Error::Geolocation(format!("Unknown position error code: {}", code))),
        }
    }
}

impl std::fmt::Display for PositionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::PositionUnavailable => write!(f, "position unavailable"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// One item of a position stream
pub type PositionEvent = std::result::Result<Position, PositionError>;

/// Trait for position sources
pub trait PositionSource: Send + Sync {
    /// Subscribe to continuous updates
    ///
    /// Fails with `Error::GeolocationUnsupported` when the source cannot
    /// provide positions at all.
    fn watch(&self, options: WatchOptions) -> Result<mpsc::Receiver<PositionEvent>>;
}

/// Source for environments without geolocation
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

impl PositionSource for Unsupported {
    fn watch(&self, _options: WatchOptions) -> Result<mpsc::Receiver<PositionEvent>> {
        Err(Error::GeolocationUnsupported)
    }
}
