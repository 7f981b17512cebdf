//! Rescale command, in memory or streamed to disk.

use crate::RescaleArgs;
use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use scanbuf_ops::{AspectMode, CancelToken, rescale, rescale_to_disk};

pub fn run(args: RescaleArgs, config: &Config, verbose: bool) -> Result<()> {
    let buffer = super::load_buffer(&args.input)?;
    let aspect: AspectMode = args.aspect.parse().map_err(|e: String| anyhow!(e))?;
    let algorithm = config.algorithm(args.filter.as_deref())?;

    if verbose {
        println!(
            "Rescaling {} to {}x{} ({}, {:?})",
            super::describe(&buffer),
            args.cols,
            args.rows,
            algorithm.name(),
            aspect
        );
    }

    if args.stream {
        let report = rescale_to_disk(&buffer, &args.output, args.rows, args.cols, aspect, algorithm, &CancelToken::new())
            .with_context(|| format!("Failed to write: {}", args.output.display()))?;
        if verbose {
            println!(
                "Streamed {}x{} x{} in {} tiles of up to {} rows ({} peak)",
                report.cols,
                report.rows,
                report.frames,
                report.tiles,
                report.tile_rows,
                super::format_size(report.peak_tile_bytes as u64)
            );
        }
        return Ok(());
    }

    let out = rescale(&buffer, args.rows, args.cols, aspect, algorithm)?;
    super::save_buffer(&args.output, &out)?;
    if verbose {
        println!("Wrote {}", super::describe(&out));
    }
    Ok(())
}
