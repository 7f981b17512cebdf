//! Preview command.

use crate::PreviewArgs;
use anyhow::Result;
use scanbuf_ops::preview;

pub fn run(args: PreviewArgs, verbose: bool) -> Result<()> {
    let buffer = super::load_buffer(&args.input)?;
    let raster = preview(&buffer, args.max, args.max)?;
    super::save_buffer(&args.output, &raster.to_buffer()?)?;
    if verbose {
        println!("Preview {}x{} written to {}", raster.cols, raster.rows, args.output.display());
    }
    Ok(())
}
