//! scanbuf - inspect and process scanbuf containers
//!
//! Every command reads one container and most write a new one.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

use config::{Config, Space};

#[derive(Parser)]
#[command(name = "scanbuf")]
#[command(author, version, about = "Inspect and process multi-frame scan containers")]
#[command(long_about = "
Inspect and process multi-frame, color-managed scan containers.

Examples:
  scanbuf info scan.tif                     # Directory shapes and metadata
  scanbuf convert scan.tif out.tif -d f32   # Change sample depth
  scanbuf convert scan.tif out.tif --to gray --intent relative
  scanbuf rescale scan.tif -o out.tif -r 1000 -c 1000 --aspect fit
  scanbuf rescale huge.tif -o out.tif -r 40000 -c 30000 --stream
  scanbuf rotate scan.tif -o out.tif ccw
  scanbuf preview scan.tif -o thumb.tif --max 256
  scanbuf profiles --channels 4
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// YAML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show directory shapes, profiles and frame metadata
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Change sample depth and/or color space
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// Resize every frame
    #[command(visible_alias = "r")]
    Rescale(RescaleArgs),

    /// Replace every sample with its complement
    Invert(InvertArgs),

    /// Halftone to 8-bit black and white
    Binarize(BinarizeArgs),

    /// Cut a region, zero-filled outside the source
    Crop(CropArgs),

    /// Quarter turns, half turn, transpose and mirrors
    Rotate(RotateArgs),

    /// Extract one channel as a gray image
    Channel(ChannelArgs),

    /// Write a downsized 8-bit sRGB rendering of the first frame
    Preview(PreviewArgs),

    /// List installed ICC profiles
    Profiles(ProfilesArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Input container(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Also print XML side channels and sample counts
    #[arg(short, long)]
    all: bool,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input container
    input: PathBuf,

    /// Output container
    output: PathBuf,

    /// Sample depth: u8, u16, f32
    #[arg(short = 'd', long)]
    depth: Option<String>,

    /// Destination ICC profile file
    #[arg(short, long, conflicts_with = "to")]
    profile: Option<PathBuf>,

    /// Destination color space, using the configured or built-in profile
    #[arg(long, value_enum)]
    to: Option<Space>,

    /// Rendering intent: perceptual, relative, saturation, absolute
    #[arg(short, long)]
    intent: Option<String>,
}

#[derive(Args)]
struct RescaleArgs {
    /// Input container
    input: PathBuf,

    /// Output container
    #[arg(short, long)]
    output: PathBuf,

    /// Target rows
    #[arg(short, long)]
    rows: usize,

    /// Target columns
    #[arg(short, long)]
    cols: usize,

    /// Aspect handling: ignore, fit, fill
    #[arg(short, long, default_value = "ignore")]
    aspect: String,

    /// Filter: nearest, linear, cubic, lanczos, super
    #[arg(short, long)]
    filter: Option<String>,

    /// Write tile by tile instead of building the result in memory
    #[arg(long)]
    stream: bool,
}

#[derive(Args)]
struct InvertArgs {
    /// Input container
    input: PathBuf,

    /// Output container
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct BinarizeArgs {
    /// Input container
    input: PathBuf,

    /// Output container
    #[arg(short, long)]
    output: PathBuf,

    /// Halftoning method
    #[arg(short, long, default_value = "white noise")]
    method: String,

    /// Random seed, for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct CropArgs {
    /// Input container
    input: PathBuf,

    /// Output container
    #[arg(short, long)]
    output: PathBuf,

    /// Top edge, may be negative
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    top: isize,

    /// Left edge, may be negative
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    left: isize,

    /// Rows to keep
    #[arg(short, long)]
    rows: usize,

    /// Columns to keep
    #[arg(short, long)]
    cols: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Rotation {
    /// Quarter turn clockwise
    Cw,
    /// Quarter turn counterclockwise
    Ccw,
    /// Half turn
    #[value(name = "180")]
    Half,
    /// Swap rows and columns
    Transpose,
    /// Mirror left to right
    FlipH,
    /// Mirror top to bottom
    FlipV,
}

#[derive(Args)]
struct RotateArgs {
    /// Input container
    input: PathBuf,

    /// Output container
    #[arg(short, long)]
    output: PathBuf,

    /// Transform to apply
    #[arg(value_enum)]
    rotation: Rotation,
}

#[derive(Args)]
struct ChannelArgs {
    /// Input container
    input: PathBuf,

    /// Output container
    #[arg(short, long)]
    output: PathBuf,

    /// Zero-based channel index
    #[arg(short, long)]
    index: usize,
}

#[derive(Args)]
struct PreviewArgs {
    /// Input container
    input: PathBuf,

    /// Output container (3-channel, 8-bit, sRGB)
    #[arg(short, long)]
    output: PathBuf,

    /// Largest side in pixels
    #[arg(short, long, default_value = "256")]
    max: usize,
}

#[derive(Args)]
struct ProfilesArgs {
    /// Extra directories to search
    #[arg(short, long)]
    dir: Vec<PathBuf>,

    /// Only profiles with this many channels
    #[arg(short, long)]
    channels: Option<u32>,

    /// Skip the platform directories
    #[arg(long)]
    no_default: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let _guard = logging::init(cli.verbose, cli.log_file.as_deref(), config.log_level.as_deref())?;

    let verbose = cli.verbose > 0;
    match cli.command {
        Commands::Info(args) => commands::info::run(args, verbose),
        Commands::Convert(args) => commands::convert::run(args, &config, verbose),
        Commands::Rescale(args) => commands::rescale::run(args, &config, verbose),
        Commands::Invert(args) => commands::invert::run(args, verbose),
        Commands::Binarize(args) => commands::binarize::run(args, verbose),
        Commands::Crop(args) => commands::crop::run(args, verbose),
        Commands::Rotate(args) => commands::rotate::run(args, verbose),
        Commands::Channel(args) => commands::channel::run(args, verbose),
        Commands::Preview(args) => commands::preview::run(args, verbose),
        Commands::Profiles(args) => commands::profiles::run(args, &config),
    }
}
