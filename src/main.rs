//! queue-board - Entry Point
//!
//! Live dashboard over the Bull/BullMQ queues found in a Redis deployment.

use log::{info, warn};
use std::process::ExitCode;

use queue_board::Server;
use queue_board::config::BoardConfig;
use queue_board::error::BoardError;
use queue_board::error::handlers::handle_error;
use queue_board::utils::logging::setup_logging;

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    info!("Launching queue-board...");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            handle_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BoardError> {
    let config = BoardConfig::load()?;
    let server = Server::new(config).await?;
    let report = server.start().await?;

    if !report.failed.is_empty() {
        warn!("Queues that did not close cleanly: {:?}", report.failed);
    }
    Ok(())
}
