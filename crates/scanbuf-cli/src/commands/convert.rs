//! Depth and color space conversion command.

use crate::ConvertArgs;
use crate::config::{Config, read_profile};
use anyhow::{Result, anyhow};
use scanbuf_core::SampleKind;
use scanbuf_icc::convert_to_profile;
use tracing::info;

pub fn run(args: ConvertArgs, config: &Config, verbose: bool) -> Result<()> {
    let mut buffer = super::load_buffer(&args.input)?;
    if verbose {
        println!("Loaded {}", super::describe(&buffer));
    }

    let target = match (&args.profile, args.to) {
        (Some(path), _) => Some(read_profile(path)?),
        (None, Some(space)) => Some(config.profile_for(space)?),
        (None, None) => None,
    };
    if let Some(profile) = target {
        let intent = config.intent(args.intent.as_deref())?;
        info!(space = %profile.color_space_name(), ?intent, "converting color space");
        buffer = convert_to_profile(&buffer, &profile, intent)?;
    }

    if let Some(depth) = &args.depth {
        let kind: SampleKind = depth.parse().map_err(|e: String| anyhow!(e))?;
        buffer = buffer.to_kind(kind)?;
    }

    super::save_buffer(&args.output, &buffer)?;
    if verbose {
        println!("Wrote {} to {}", super::describe(&buffer), args.output.display());
    }
    Ok(())
}
