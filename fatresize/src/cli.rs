// SPDX-License-Identifier: MIT

use clap::{ArgAction, Parser};

use crate::size::{SizeError, SizeRequest, parse_size};

#[derive(Parser, Debug)]
#[command(
    name = "fatresize",
    version,
    about = "Resize an FAT16/FAT32 volume non-destructively",
    long_about = None
)]
pub struct Cli {
    /// Device or image path (e.g. /dev/sda1, disk.img)
    pub device: String,

    /// Resize volume to SIZE[k|M|G|ki|Mi|Gi] bytes or "max"
    #[arg(short, long, value_name = "SIZE")]
    pub size: Option<String>,

    /// Show volume information
    #[arg(short, long)]
    pub info: bool,

    /// Do not ask questions
    #[arg(short, long = "force-yes")]
    pub force_yes: bool,

    /// Specify partition number
    #[arg(short = 'n', long = "partition", value_name = "NUM")]
    pub partition: Option<u32>,

    /// Show progress
    #[arg(short, long)]
    pub progress: bool,

    /// Be quiet
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose, repeatable
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Run configuration, built once from the parsed command line and passed
/// through the pipeline; there is no process-wide option state.
#[derive(Debug, Clone)]
pub struct Options {
    pub path: String,
    pub size: Option<SizeRequest>,
    pub pnum: Option<u32>,
    pub info: bool,
    pub force_yes: bool,
    pub progress: bool,
    /// `-1` quiet, `0` normal, more with each `-v`.
    pub verbosity: i32,
}

impl Options {
    pub fn from_cli(cli: &Cli) -> Result<Self, SizeError> {
        let size = cli.size.as_deref().map(parse_size).transpose()?;
        Ok(Self {
            path: cli.device.clone(),
            size,
            pnum: cli.partition,
            info: cli.info,
            force_yes: cli.force_yes,
            progress: cli.progress,
            verbosity: if cli.quiet { -1 } else { cli.verbose as i32 },
        })
    }
}
