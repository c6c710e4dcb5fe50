//! mapnav CLI entry point
//!
//! Place search, position tracking and driving routes - CLI + web app

use mapnav::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
