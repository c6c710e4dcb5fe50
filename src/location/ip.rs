//! IP-based position source
//!
//! Uses ip-api.com to approximate the device position. Precision is
//! city-level, so `high_accuracy` cannot be honored and fixes carry a wide
//! accuracy radius.

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::location::{Position, PositionError, PositionEvent, PositionSource, WatchOptions, EVENT_BUFFER};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Accuracy radius reported for IP fixes
pub const IP_ACCURACY_M: f64 = 5_000.0;

/// Polling position source backed by ip-api.com
#[derive(Debug, Clone)]
pub struct IpPositionSource {
    client: reqwest::Client,
    url: String,
    poll_interval: Duration,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

impl IpPositionSource {
    /// Create a source polling `url` every `poll_interval`
    pub fn new(client: reqwest::Client, url: &str, poll_interval: Duration) -> Self {
        Self {
            client,
            url: url.to_string(),
            poll_interval,
        }
    }

    /// Fetch one fix from ip-api.com
    async fn fetch(&self) -> Result<Position> {
        let response = self.client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Geolocation(format!("IP location request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geolocation(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Geolocation(format!("Failed to parse IP location response: {}", e)))?;

        Self::to_position(data)
    }

    fn to_position(data: IpApiResponse) -> Result<Position> {
        if data.status != "success" {
            return Err(Error::Geolocation(format!(
                "IP location lookup failed: {}",
                data.message.unwrap_or_else(|| data.status.clone())
            )));
        }

        let lat = data.lat.ok_or_else(|| Error::Geolocation("No latitude in response".to_string()))?;
        let lng = data.lon.ok_or_else(|| Error::Geolocation("No longitude in response".to_string()))?;

        Ok(Position::now(Coordinate::new(lat, lng), IP_ACCURACY_M))
    }
}

impl PositionSource for IpPositionSource {
    fn watch(&self, options: WatchOptions) -> Result<mpsc::Receiver<PositionEvent>> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| Error::GeolocationUnsupported)?;

        if options.high_accuracy {
            debug!("IP position source ignores high-accuracy mode");
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let source = self.clone();

        runtime.spawn(async move {
            let mut last_fix: Option<Position> = None;
            let mut ticker = tokio::time::interval(source.poll_interval);

            loop {
                ticker.tick().await;

                let event = match last_fix.filter(|fix| fix.is_fresh(options.maximum_age)) {
                    Some(fix) => Ok(fix),
                    None => match source.fetch().await {
                        Ok(fix) => {
                            last_fix = Some(fix);
                            Ok(fix)
                        }
                        Err(e) => {
                            warn!("{}", e);
                            Err(PositionError::PositionUnavailable)
                        }
                    },
                };

                if tx.send(event).await.is_err() {
                    debug!("IP position watcher closed");
                    break;
                }
            }
        });

        Ok(rx)
    }
}
