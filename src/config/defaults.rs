//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Zoom level used when flying to a search result
pub const DEFAULT_SEARCH_ZOOM: u8 = 14;

/// Zoom level used when centering on a GPS fix
pub const DEFAULT_LOCATION_ZOOM: u8 = 16;

/// Radius of the acknowledgment pulse in meters
pub const DEFAULT_PULSE_RADIUS_M: f64 = 60.0;

/// How long the acknowledgment pulse stays on the map
pub const DEFAULT_PULSE_MS: u64 = 2000;

/// Padding (pixels, both axes) when fitting the viewport to a route
pub const DEFAULT_ROUTE_PADDING: u32 = 40;

/// Arrow animation frame interval (~60 Hz)
pub const DEFAULT_FRAME_MS: u64 = 16;

/// Search debounce delay
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Request a high-accuracy fix from the position source
pub const DEFAULT_HIGH_ACCURACY: bool = true;

/// Maximum wait for a position event before reporting a timeout
pub const DEFAULT_GEO_TIMEOUT_MS: u64 = 10_000;

/// Maximum age of a fix a source may replay (0 = always fresh)
pub const DEFAULT_MAXIMUM_AGE_MS: u64 = 0;

/// Poll interval of the IP position source, kept below the geolocation timeout
pub const DEFAULT_IP_POLL_SECS: u64 = 5;

/// HTTP client timeout in seconds (0 = rely on the network stack)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 0;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "mapnav";
