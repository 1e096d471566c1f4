use log::{error, info};
use thiserror::Error;

use ems_server::Config;

/// Errors that are critical to the entire server.
#[derive(Debug, Error)]
enum Error {
    #[error("Invalid configuration: {0}")]
    Config(#[from] figment::Error),
    #[error("Failed to launch: {0}")]
    Launch(#[from] ems_server::error::Error),
}

async fn run() -> Result<(), Error> {
    info!("Configuring server...");
    let config = Config::load()?;
    let server = ems_server::build(config).await?;
    info!("...server configured!");
    server.run().await;
    Ok(())
}

#[tokio::main]
async fn main() {
    // Set up logging.
    log4rs::init_file("log4rs.yaml", Default::default()).expect("Failed to initialise logging");
    info!("Initialised logging");

    // Launch server.
    if let Err(err) = run().await {
        error!("{err}");
        error!("Critical failure, shutting down");
        std::process::exit(1)
    }
}
