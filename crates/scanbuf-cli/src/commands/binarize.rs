//! Binarize command.

use crate::BinarizeArgs;
use anyhow::{Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use scanbuf_core::BinaryMethod;

pub fn run(args: BinarizeArgs, verbose: bool) -> Result<()> {
    let method: BinaryMethod = args.method.parse().map_err(|e: String| anyhow!(e))?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let buffer = super::load_buffer(&args.input)?;
    let out = buffer.to_binary(method, &mut rng)?;
    super::save_buffer(&args.output, &out)?;
    if verbose {
        let on = out.data().iter().filter(|&&v| v != 0).count();
        println!("Binarized by {}: {on} of {} samples set", method.name(), out.data().len());
    }
    Ok(())
}
