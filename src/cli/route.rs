//! Route command handler
//!
//! "my location" endpoints are resolved from an IP-based fix.

use crate::cli::print_view;
use crate::cli::track::ip_source;
use crate::config::Config;
use crate::controller::{self, is_my_location, LiveController};
use crate::error::Result;
use clap::Args;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// How often to check whether the first fix has arrived
const FIX_POLL: Duration = Duration::from_millis(100);

/// Route command arguments
#[derive(Args)]
pub struct RouteArgs {
    /// Start ("my location" uses the current position)
    pub from: String,

    /// Destination ("my location" uses the current position)
    pub to: String,

    /// Output format (json, text, gpx)
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,
}

/// Run the route command
pub async fn run(args: RouteArgs) -> Result<()> {
    let config = Config::load()?;
    let controller = controller::live(&config)?;

    if is_my_location(&args.from) || is_my_location(&args.to) {
        let source = ip_source(&config)?;
        if let Some(tracking) = controller.start_tracking(&source) {
            wait_for_fix(&controller, controller.settings().watch.timeout).await;
            tracking.abort();
        }
    }

    controller.route(&args.from, &args.to).await;

    print_view(&controller, &args.format)
}

/// Wait until a fix is known or `timeout` elapses
async fn wait_for_fix(controller: &LiveController, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while controller.user_location().is_none() {
        if Instant::now() >= deadline {
            warn!("No position fix within {:?}", timeout);
            return;
        }
        tokio::time::sleep(FIX_POLL).await;
    }
}
