//! Search command handler

use crate::cli::print_view;
use crate::config::Config;
use crate::controller;
use crate::error::Result;
use clap::Args;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Place to look up (words are joined with spaces)
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Output format (json, text, gpx)
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    let config = Config::load()?;
    let controller = controller::live(&config)?;

    controller.search(&args.query.join(" ")).await;

    print_view(&controller, &args.format)
}
