use std::process::ExitCode;

use boot::bootstrap::{self, config::Args};
use boot_services::Context;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match bootstrap::config::load(&args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    bootstrap::tracing::setup(&settings);

    let app = bootstrap::app::application(&settings);

    match app.run(&Context::new()).await {
        Ok(()) => {
            tracing::info!("Boot successfully shutdown.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(%err, "Boot shutdown with errors.");
            ExitCode::FAILURE
        }
    }
}
