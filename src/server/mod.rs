//! HTTP server for mapnav
//!
//! Exposes the map controller to a browser page: the page posts its
//! `watchPosition` events and UI actions, and polls the rendered state.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::controller;
use crate::error::{Error, Result};
use crate::location::Unsupported;
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Start the HTTP server
///
/// With `geolocation` off, tracking reports the source as unsupported.
///
/// # Returns
/// Never returns unless the server shuts down
pub async fn run(config: Config, geolocation: bool) -> Result<()> {
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let controller = controller::live(&config)?;
    let state = Arc::new(AppState::new(config, Arc::clone(&controller)));

    let tracking = if geolocation {
        controller.start_tracking(state.gps.as_ref())
    } else {
        controller.start_tracking(&Unsupported)
    };

    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    let served = axum::serve(listener, app)
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)));

    if let Some(tracking) = tracking {
        tracking.abort();
    }

    served
}
