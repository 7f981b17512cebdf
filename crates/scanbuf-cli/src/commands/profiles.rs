//! Installed profile listing.

use crate::ProfilesArgs;
use crate::config::Config;
use anyhow::Result;
use scanbuf_icc::ProfileCatalog;

pub fn run(args: ProfilesArgs, config: &Config) -> Result<()> {
    let mut dirs = if args.no_default { Vec::new() } else { ProfileCatalog::default_dirs() };
    dirs.extend(config.profile_dirs.iter().cloned());
    dirs.extend(args.dir);

    let catalog = ProfileCatalog::scan(&dirs);
    if catalog.is_empty() {
        println!("No profiles found.");
        return Ok(());
    }
    for channels in catalog.channel_counts() {
        if args.channels.is_some_and(|c| c != channels) {
            continue;
        }
        println!("{channels} channel(s):");
        for entry in catalog.with_channels(channels) {
            println!("  {}  {}", entry.description, entry.path.display());
        }
    }
    Ok(())
}
