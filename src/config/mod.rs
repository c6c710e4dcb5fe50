//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/mapnav/config.toml

pub mod defaults;

use crate::constants::api::{IP_API_URL, NOMINATIM_URL, OSRM_URL, USER_AGENT};
use crate::error::{Error, Result};
use crate::location::WatchOptions;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// External service endpoints
    #[serde(default)]
    pub services: ServicesConfig,

    /// Map rendering and interaction timings
    #[serde(default)]
    pub map: MapConfig,

    /// Position tracking settings
    #[serde(default)]
    pub geolocation: GeolocationConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// External service endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Nominatim base URL
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    /// OSRM base URL
    #[serde(default = "default_osrm_url")]
    pub osrm_url: String,

    /// IP geolocation endpoint
    #[serde(default = "default_ip_location_url")]
    pub ip_location_url: String,

    /// User agent for outgoing requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds, 0 disables it
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

/// Map rendering and interaction timings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_search_zoom")]
    pub search_zoom: u8,

    #[serde(default = "default_location_zoom")]
    pub location_zoom: u8,

    #[serde(default = "default_pulse_radius")]
    pub pulse_radius_m: f64,

    #[serde(default = "default_pulse_ms")]
    pub pulse_ms: u64,

    #[serde(default = "default_route_padding")]
    pub route_padding: u32,

    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Position tracking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,

    #[serde(default = "default_geo_timeout")]
    pub timeout_ms: u64,

    #[serde(default = "default_maximum_age")]
    pub maximum_age_ms: u64,

    /// Poll interval of the IP-based source used by `mapnav track`
    #[serde(default = "default_ip_poll")]
    pub ip_poll_secs: u64,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions for serde
fn default_nominatim_url() -> String {
    NOMINATIM_URL.to_string()
}
fn default_osrm_url() -> String {
    OSRM_URL.to_string()
}
fn default_ip_location_url() -> String {
    IP_API_URL.to_string()
}
fn default_user_agent() -> String {
    USER_AGENT.to_string()
}
fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}
fn default_search_zoom() -> u8 {
    DEFAULT_SEARCH_ZOOM
}
fn default_location_zoom() -> u8 {
    DEFAULT_LOCATION_ZOOM
}
fn default_pulse_radius() -> f64 {
    DEFAULT_PULSE_RADIUS_M
}
fn default_pulse_ms() -> u64 {
    DEFAULT_PULSE_MS
}
fn default_route_padding() -> u32 {
    DEFAULT_ROUTE_PADDING
}
fn default_frame_ms() -> u64 {
    DEFAULT_FRAME_MS
}
fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
fn default_high_accuracy() -> bool {
    DEFAULT_HIGH_ACCURACY
}
fn default_geo_timeout() -> u64 {
    DEFAULT_GEO_TIMEOUT_MS
}
fn default_maximum_age() -> u64 {
    DEFAULT_MAXIMUM_AGE_MS
}
fn default_ip_poll() -> u64 {
    DEFAULT_IP_POLL_SECS
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            nominatim_url: default_nominatim_url(),
            osrm_url: default_osrm_url(),
            ip_location_url: default_ip_location_url(),
            user_agent: default_user_agent(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            search_zoom: default_search_zoom(),
            location_zoom: default_location_zoom(),
            pulse_radius_m: default_pulse_radius(),
            pulse_ms: default_pulse_ms(),
            route_padding: default_route_padding(),
            frame_ms: default_frame_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            high_accuracy: default_high_accuracy(),
            timeout_ms: default_geo_timeout(),
            maximum_age_ms: default_maximum_age(),
            ip_poll_secs: default_ip_poll(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServicesConfig {
    /// Build the shared HTTP client for the geocoder and router
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(&self.user_agent);
        if self.http_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(self.http_timeout_secs));
        }
        builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
    }
}

impl GeolocationConfig {
    /// Options handed to a position source when subscribing
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            high_accuracy: self.high_accuracy,
            timeout: Duration::from_millis(self.timeout_ms),
            maximum_age: Duration::from_millis(self.maximum_age_ms),
        }
    }

    /// Poll interval for the IP position source
    ///
    /// At most half the watch timeout, so a healthy source never lets the
    /// tracking loop time out between fixes. Never below one second.
    pub fn ip_poll_interval(&self) -> Duration {
        let configured = Duration::from_secs(self.ip_poll_secs);
        let ceiling = Duration::from_millis(self.timeout_ms) / 2;
        configured.min(ceiling).max(Duration::from_secs(1))
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["services", "nominatim_url"] => Some(self.services.nominatim_url.clone()),
            ["services", "osrm_url"] => Some(self.services.osrm_url.clone()),
            ["services", "ip_location_url"] => Some(self.services.ip_location_url.clone()),
            ["services", "user_agent"] => Some(self.services.user_agent.clone()),
            ["services", "http_timeout_secs"] => Some(self.services.http_timeout_secs.to_string()),

            ["map", "search_zoom"] => Some(self.map.search_zoom.to_string()),
            ["map", "location_zoom"] => Some(self.map.location_zoom.to_string()),
            ["map", "pulse_radius_m"] => Some(self.map.pulse_radius_m.to_string()),
            ["map", "pulse_ms"] => Some(self.map.pulse_ms.to_string()),
            ["map", "route_padding"] => Some(self.map.route_padding.to_string()),
            ["map", "frame_ms"] => Some(self.map.frame_ms.to_string()),
            ["map", "debounce_ms"] => Some(self.map.debounce_ms.to_string()),

            ["geolocation", "high_accuracy"] => Some(self.geolocation.high_accuracy.to_string()),
            ["geolocation", "timeout_ms"] => Some(self.geolocation.timeout_ms.to_string()),
            ["geolocation", "maximum_age_ms"] => Some(self.geolocation.maximum_age_ms.to_string()),
            ["geolocation", "ip_poll_secs"] => Some(self.geolocation.ip_poll_secs.to_string()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["services", "nominatim_url"] => self.services.nominatim_url = value.to_string(),
            ["services", "osrm_url"] => self.services.osrm_url = value.to_string(),
            ["services", "ip_location_url"] => self.services.ip_location_url = value.to_string(),
            ["services", "user_agent"] => self.services.user_agent = value.to_string(),
            ["services", "http_timeout_secs"] => {
                self.services.http_timeout_secs = parse_value(key, value)?;
            }

            ["map", "search_zoom"] => self.map.search_zoom = parse_value(key, value)?,
            ["map", "location_zoom"] => self.map.location_zoom = parse_value(key, value)?,
            ["map", "pulse_radius_m"] => self.map.pulse_radius_m = parse_value(key, value)?,
            ["map", "pulse_ms"] => self.map.pulse_ms = parse_value(key, value)?,
            ["map", "route_padding"] => self.map.route_padding = parse_value(key, value)?,
            ["map", "frame_ms"] => {
                let frame_ms: u64 = parse_value(key, value)?;
                if frame_ms == 0 {
                    return Err(Error::Config("map.frame_ms must be positive".to_string()));
                }
                self.map.frame_ms = frame_ms;
            }
            ["map", "debounce_ms"] => self.map.debounce_ms = parse_value(key, value)?,

            ["geolocation", "high_accuracy"] => {
                self.geolocation.high_accuracy = parse_value(key, value)?;
            }
            ["geolocation", "timeout_ms"] => {
                let timeout_ms: u64 = parse_value(key, value)?;
                if timeout_ms == 0 {
                    return Err(Error::Config("geolocation.timeout_ms must be positive".to_string()));
                }
                self.geolocation.timeout_ms = timeout_ms;
            }
            ["geolocation", "maximum_age_ms"] => {
                self.geolocation.maximum_age_ms = parse_value(key, value)?;
            }
            ["geolocation", "ip_poll_secs"] => {
                self.geolocation.ip_poll_secs = parse_value(key, value)?;
            }

            ["server", "host"] => self.server.host = value.to_string(),
            ["server", "port"] => self.server.port = parse_value(key, value)?,

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "services.nominatim_url",
            "services.osrm_url",
            "services.ip_location_url",
            "services.user_agent",
            "services.http_timeout_secs",
            "map.search_zoom",
            "map.location_zoom",
            "map.pulse_radius_m",
            "map.pulse_ms",
            "map.route_padding",
            "map.frame_ms",
            "map.debounce_ms",
            "geolocation.high_accuracy",
            "geolocation.timeout_ms",
            "geolocation.maximum_age_ms",
            "geolocation.ip_poll_secs",
            "server.host",
            "server.port",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}
