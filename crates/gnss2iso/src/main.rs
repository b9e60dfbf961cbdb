//! gnss2iso - Country codes and coordinates of GNSS stations
//!
//! Loads a GeoJSON country dataset, builds stations from command-line
//! coordinates and prints lookups. Logs go to stderr, results to stdout.

mod commands;
mod error;
mod loader;
mod settings;

use clap::Parser;
use settings::Settings;
use std::process::ExitCode;

fn main() -> ExitCode {
    let settings = Settings::parse();
    setup_logging(settings.verbose);

    match commands::run(&settings) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Install the fmt subscriber, honoring RUST_LOG when set
fn setup_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose {
        "debug"
    } else if cfg!(debug_assertions) {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
