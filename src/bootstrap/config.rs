//! Command line arguments and the settings they point to.
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

use crate::settings::Settings;

/// Composes services into a tree and runs it until asked to stop.
#[derive(Clone, Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Path to the TOML settings file. A missing file leaves the defaults in place.
    #[arg(long, env = "BOOT_CONFIG", default_value = "boot.toml")]
    pub config: PathBuf,

    /// Seconds the services are given to stop, overriding the settings.
    #[arg(long, value_name = "SECS")]
    pub shutdown_timeout: Option<u64>,
}

/// Loads the settings named by the arguments and applies the command line overrides.
///
/// # Errors
///
/// Will return an error if the settings cannot be extracted.
pub fn load(args: &Args) -> anyhow::Result<Settings> {
    let mut settings =
        Settings::load(&args.config).with_context(|| format!("failed to load the settings from {}", args.config.display()))?;

    if let Some(shutdown_timeout) = args.shutdown_timeout {
        settings.shutdown_timeout = shutdown_timeout;
    }

    Ok(settings)
}
