mod alert;
mod capture;
mod common;
mod config;
mod coordinator;
mod detect;
mod error;
mod evidence;
mod monitor;

use crate::capture::DirectorySource;
use crate::config::Configuration;
use crate::coordinator::CoordinatorBuilder;
use crate::error::AppError;
use tracing::Level;

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();

    let config_path = std::env::args().nth(1);
    let configuration = Configuration::load(config_path.as_deref())?;

    let source = DirectorySource::new(&configuration.frame_dir)?;
    let coordinator = CoordinatorBuilder::new(configuration)
        .source(Box::new(source))
        .build()?;

    let cancel = coordinator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received; shutting down.");
            cancel.cancel();
        }
    });

    coordinator.join().await;
    Ok(())
}
