//! Crop command

use crate::CropArgs;
use anyhow::Result;
use scanbuf_ops::crop;

pub fn run(args: CropArgs, verbose: bool) -> Result<()> {
    let buffer = super::load_buffer(&args.input)?;

    if verbose {
        println!(
            "Cropping {}x{} @ ({},{}) from {}x{}",
            args.cols,
            args.rows,
            args.left,
            args.top,
            buffer.cols(),
            buffer.rows()
        );
    }

    let out = crop(&buffer, args.top, args.left, args.rows, args.cols)?;
    super::save_buffer(&args.output, &out)?;

    if verbose {
        println!("Done.");
    }
    Ok(())
}
