//! Channel extraction command.

use crate::ChannelArgs;
use anyhow::Result;
use scanbuf_ops::extract_channel;

pub fn run(args: ChannelArgs, verbose: bool) -> Result<()> {
    let buffer = super::load_buffer(&args.input)?;
    let out = extract_channel(&buffer, args.index)?;
    super::save_buffer(&args.output, &out)?;
    if verbose {
        println!("Extracted channel {} of {}", args.index, super::describe(&buffer));
    }
    Ok(())
}
