//! Track command handler
//!
//! Follows the IP-based position and prints the view whenever the scene or
//! the status line changes.

use crate::cli::print_view;
use crate::config::Config;
use crate::controller;
use crate::error::Result;
use crate::location::ip::IpPositionSource;
use clap::Args;
use std::time::Duration;

/// How often the scene is checked for changes
const REFRESH: Duration = Duration::from_millis(250);

/// Track command arguments
#[derive(Args)]
pub struct TrackArgs {
    /// Stop after this many updates (0 = run until interrupted)
    #[arg(long, short = 'n', default_value = "1")]
    pub count: usize,

    /// Output format (json, text, gpx)
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,
}

/// Position source used by the CLI
pub(crate) fn ip_source(config: &Config) -> Result<IpPositionSource> {
    Ok(IpPositionSource::new(
        config.services.http_client()?,
        &config.services.ip_location_url,
        config.geolocation.ip_poll_interval(),
    ))
}

/// Run the track command
pub async fn run(args: TrackArgs) -> Result<()> {
    let config = Config::load()?;
    let controller = controller::live(&config)?;
    let source = ip_source(&config)?;

    let Some(tracking) = controller.start_tracking(&source) else {
        return print_view(&controller, &args.format);
    };

    let initial = controller.view();
    let mut last_seen = (initial.scene.revision, initial.panel.status);
    let mut printed = 0;

    while args.count == 0 || printed < args.count {
        tokio::time::sleep(REFRESH).await;

        let view = controller.view();
        let seen = (view.scene.revision, view.panel.status);
        if seen == last_seen {
            continue;
        }
        last_seen = seen;

        print_view(&controller, &args.format)?;
        printed += 1;
    }

    tracking.abort();
    Ok(())
}
