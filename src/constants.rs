//! Centralized constants for the mapnav crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// OSRM public demo routing server
    pub const OSRM_URL: &str = "https://router.project-osrm.org";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// User agent sent with every outgoing request (Nominatim rejects anonymous clients)
    pub const USER_AGENT: &str = concat!("mapnav/", env!("CARGO_PKG_VERSION"));
}

/// Texts shown in the status and result regions of the UI
pub mod messages {
    pub const ENTER_PLACE: &str = "Please enter a place.";
    pub const SEARCHING: &str = "Searching…";
    pub const NO_MATCH: &str = "No match found.";
    pub const NETWORK_ERROR: &str = "Network error";

    pub const ENTER_BOTH: &str = "Enter both locations.";
    pub const LOCATION_NOT_FOUND: &str = "Location not found.";
    pub const ROUTE_UNAVAILABLE: &str = "Route not available.";

    pub const WAITING_FOR_GPS: &str = "Waiting for GPS signal...";
    pub const GEOLOCATION_UNSUPPORTED: &str = "Geolocation not supported";

    /// Value written into the "from" field when a GPS fix arrives
    pub const MY_LOCATION: &str = "My Location";

    pub const YOU_ARE_HERE: &str = "📍 You are here";
}

/// Styling shared by rendered overlays
pub mod style {
    pub const ACCENT_COLOR: &str = "#00bfff";

    pub const GLOW_MARKER_CLASS: &str = "glow-marker";
    pub const ARROW_ICON_CLASS: &str = "arrow-icon";
    pub const ROUTE_LINE_CLASS: &str = "animated-line";

    pub const ROUTE_LINE_WEIGHT: u32 = 4;
    pub const PULSE_FILL_OPACITY: f64 = 0.2;
    pub const ACCURACY_FILL_OPACITY: f64 = 0.15;
}
