//! Subscriber setup.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Level for a `-v` count.
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs stderr logging plus an optional file writer.
///
/// `RUST_LOG` wins, then `-v`, then the configured level. Keep the returned
/// guard alive until exit so the file writer flushes.
pub fn init(verbose: u8, log_file: Option<&Path>, configured: Option<&str>) -> Result<Option<WorkerGuard>> {
    let level = match (verbose, configured) {
        (0, Some(level)) => level,
        (v, _) => level_for(v),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let (file, guard) = match log_file {
        Some(path) => {
            let out = std::fs::File::create(path).with_context(|| format!("Failed to create log: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(out);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init()
        .context("Failed to install logger")?;
    Ok(guard)
}
