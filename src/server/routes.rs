//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::controller::{Panel, ViewState};
use crate::coord::Coordinate;
use crate::error::Error;
use crate::geo::GeoBackend;
use crate::location::{Position, PositionError};
use crate::routing::RouteBackend;
use crate::server::state::AppState;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::debug;

/// Create the API router
pub fn create_router<G, R>(state: Arc<AppState<G, R>>) -> Router
where
    G: GeoBackend,
    R: RouteBackend,
{
    Router::new()
        .route("/api/search", post(search_handler::<G, R>))
        .route("/api/route", post(route_handler::<G, R>))
        .route("/api/position", post(position_handler::<G, R>))
        .route("/api/geolocation", get(geolocation_handler::<G, R>))
        .route("/api/state", get(state_handler::<G, R>))
        .route("/api/status", get(status_handler::<G, R>))
        .fallback_service(ServeDir::new(static_path()).append_index_html_on_directories(true))
        .with_state(state)
}

/// Static files path: `static` under the cwd, else next to the executable
///
/// The crate ships `static/index.html`, the map page driving this API.
fn static_path() -> String {
    if std::path::Path::new("static").exists() {
        return "static".to_string();
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("static")))
        .filter(|path| path.exists())
        .map(|path| path.to_string_lossy().to_string())
        .unwrap_or_else(|| "static".to_string())
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::Geolocation(_) => "GEOLOCATION_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
        }
    }
}

/// Search request body
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Debounced place search
///
/// POST /api/search
async fn search_handler<G, R>(
    State(state): State<Arc<AppState<G, R>>>,
    Json(req): Json<SearchRequest>,
) -> StatusCode
where
    G: GeoBackend,
    R: RouteBackend,
{
    state.controller.trigger_search(req.query);
    StatusCode::ACCEPTED
}

/// Route request body
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// Resolve both endpoints and draw the route
///
/// POST /api/route
async fn route_handler<G, R>(
    State(state): State<Arc<AppState<G, R>>>,
    Json(req): Json<RouteRequest>,
) -> Json<Panel>
where
    G: GeoBackend,
    R: RouteBackend,
{
    state.controller.route(&req.from, &req.to).await;
    Json(state.controller.panel())
}

/// One `watchPosition` callback forwarded by the page
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PositionReport {
    Fix {
        lat: f64,
        lng: f64,
        #[serde(default)]
        accuracy: f64,
    },
    Failure {
        error: u16,
    },
}

/// Position report response
#[derive(Debug, Serialize, Deserialize)]
pub struct PositionAck {
    /// Whether a tracking subscription received the event
    pub delivered: bool,
}

/// Feed the GPS stream
///
/// POST /api/position
async fn position_handler<G, R>(
    State(state): State<Arc<AppState<G, R>>>,
    Json(report): Json<PositionReport>,
) -> Result<(StatusCode, Json<PositionAck>), ApiError>
where
    G: GeoBackend,
    R: RouteBackend,
{
    let event = match report {
        PositionReport::Fix { lat, lng, accuracy } => {
            let coord = Coordinate::new(lat, lng);
            coord.validate()?;
            if accuracy.is_nan() || accuracy < 0.0 {
                return Err(ApiError {
                    error: format!("Accuracy must not be negative: {}", accuracy),
                    code: "INVALID_ACCURACY".to_string(),
                });
            }
            Ok(Position::now(coord, accuracy))
        }
        PositionReport::Failure { error } => Err(PositionError::from_code(error)?),
    };

    let delivered = state.gps.publish(event).await;
    debug!("Position report delivered: {}", delivered);

    Ok((StatusCode::ACCEPTED, Json(PositionAck { delivered })))
}

/// Options for the page's `watchPosition` call
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeolocationOptions {
    pub enable_high_accuracy: bool,
    /// Milliseconds
    pub timeout: u64,
    /// Milliseconds
    pub maximum_age: u64,
}

/// GET /api/geolocation
async fn geolocation_handler<G, R>(
    State(state): State<Arc<AppState<G, R>>>,
) -> Json<GeolocationOptions>
where
    G: GeoBackend,
    R: RouteBackend,
{
    let geolocation = &state.config.geolocation;
    Json(GeolocationOptions {
        enable_high_accuracy: geolocation.high_accuracy,
        timeout: geolocation.timeout_ms,
        maximum_age: geolocation.maximum_age_ms,
    })
}

/// Scene, overlays and panel texts
///
/// GET /api/state
async fn state_handler<G, R>(State(state): State<Arc<AppState<G, R>>>) -> Json<ViewState>
where
    G: GeoBackend,
    R: RouteBackend,
{
    Json(state.controller.view())
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Uptime in seconds
    pub uptime_secs: u64,
    /// Places in the search cache
    pub cached_places: usize,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler<G, R>(State(state): State<Arc<AppState<G, R>>>) -> Json<StatusResponse>
where
    G: GeoBackend,
    R: RouteBackend,
{
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        cached_places: state.controller.cached_places(),
    })
}
