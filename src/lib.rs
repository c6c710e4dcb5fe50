//! mapnav: map interaction controller
//!
//! A library and CLI tool that turns place searches, "from/to" route requests
//! and a stream of GPS fixes into overlays on a map.
//!
//! ## Features
//!
//! - Debounced place search with a per-session cache (Nominatim)
//! - Driving routes and road distance (OSRM) with an animated direction arrow
//! - Continuous position tracking with a one-time "unsupported" alert
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use mapnav::coord::{format_km, Bounds, Coordinate};
//!
//! let path = [Coordinate::new(52.52, 13.405), Coordinate::new(48.8566, 2.3522)];
//! let bounds = Bounds::of_path(&path).unwrap();
//! println!("Route spans {:?}", bounds);
//!
//! assert_eq!(format_km(12345.0), "12.35 km");
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod controller;
pub mod coord;
pub mod error;
pub mod format;
pub mod geo;
pub mod location;
pub mod map;
pub mod routing;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use controller::{MapController, Panel, ViewState};
pub use coord::Coordinate;
pub use error::{Error, Result};
pub use map::scene::MapScene;
