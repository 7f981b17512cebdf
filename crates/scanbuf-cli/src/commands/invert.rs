//! Invert command.

use crate::InvertArgs;
use anyhow::Result;

pub fn run(args: InvertArgs, verbose: bool) -> Result<()> {
    let buffer = super::load_buffer(&args.input)?;
    let out = buffer.invert()?;
    super::save_buffer(&args.output, &out)?;
    if verbose {
        println!("Inverted {}", super::describe(&out));
    }
    Ok(())
}
