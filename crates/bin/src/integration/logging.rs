//! Tracing subscriber setup.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Name of the log file written next to the outputs.
pub(crate) const LOG_FILE: &str = "run.log";

fn filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Log to stderr only.
pub(crate) fn init_stderr(verbose: bool) {
    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Log to stderr and to `run.log` in `output_dir` (truncated, no ANSI).
pub(crate) fn init_with_file(verbose: bool, output_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(output_dir)?;
    let file = File::create(output_dir.join(LOG_FILE))?;

    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .init();
    Ok(())
}
