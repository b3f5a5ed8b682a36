use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod ingest;
mod llm;
mod util;
mod web;

use crate::config::{AppConfig, CliArgs};
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // One session lives for the lifetime of the process; restarting the
    // server is how a session ends.
    let app_state = Arc::new(AppState::new(config.clone()));

    // Start the web server
    info!(
        "Starting text2sql server on {}:{}",
        config.web.host, config.web.port
    );
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(
                Box::new(std::io::Error::other(e.to_string())) as Box<dyn std::error::Error>
            );
        }
    }

    Ok(())
}
