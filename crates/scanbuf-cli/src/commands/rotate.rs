//! Rotate and flip command.

use crate::{RotateArgs, Rotation};
use anyhow::Result;
use scanbuf_ops::{flip_left_right, flip_up_down, rotate90, rotate180, transpose, unrotate90};

pub fn run(args: RotateArgs, verbose: bool) -> Result<()> {
    let buffer = super::load_buffer(&args.input)?;
    let out = match args.rotation {
        Rotation::Cw => unrotate90(&buffer)?,
        Rotation::Ccw => rotate90(&buffer)?,
        Rotation::Half => rotate180(&buffer)?,
        Rotation::Transpose => transpose(&buffer)?,
        Rotation::FlipH => flip_left_right(&buffer)?,
        Rotation::FlipV => flip_up_down(&buffer)?,
    };
    super::save_buffer(&args.output, &out)?;
    if verbose {
        println!("{} -> {}", super::describe(&buffer), super::describe(&out));
    }
    Ok(())
}
