//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod route;
pub mod search;
pub mod serve;
pub mod track;

use crate::controller::{LiveController, ViewState};
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Place search, GPS tracking and driving routes on a map
#[derive(Parser)]
#[command(name = "mapnav")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for a place
    Search(search::SearchArgs),

    /// Driving route and road distance between two places
    Route(route::RouteArgs),

    /// Follow the current position
    Track(track::TrackArgs),

    /// Start the web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    };
    init_logging(default_level);

    match cli.command {
        Commands::Search(args) => search::run(args).await,
        Commands::Route(args) => route::run(args).await,
        Commands::Track(args) => track::run(args).await,
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}

/// Install the tracing subscriber; RUST_LOG overrides `default_level`
fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

/// Print the controller view in the requested format
pub(crate) fn print_view(controller: &LiveController, format: &str) -> Result<()> {
    print!("{}", render_view(&controller.view(), format)?);
    Ok(())
}

fn render_view(view: &ViewState, format: &str) -> Result<String> {
    let formatter = get_formatter(format).ok_or_else(|| {
        let known: Vec<String> = available_formats().into_iter().map(|f| f.name).collect();
        Error::Config(format!(
            "Unknown format: {} (available: {})",
            format,
            known.join(", ")
        ))
    })?;
    formatter.format(view)
}
