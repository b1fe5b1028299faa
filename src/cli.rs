// pixtune/src/cli.rs
use crate::core::{OutputFormat, ResizeAlgorithm};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Upload limit carried over from the browser tool.
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "pixtune", version, about = "Resize, compress and pad images to a target size")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Reject input files larger than this many bytes
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_INPUT_BYTES)]
    pub max_input_size: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show dimensions, format and size of an image
    Info {
        input: PathBuf,
    },

    /// Resample to exact dimensions (output is always PNG)
    Resize {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target width in pixels
        #[arg(short, long)]
        width: Option<u32>,

        /// Target height in pixels
        #[arg(short = 'H', long)]
        height: Option<u32>,

        /// Derive the missing side from the source aspect ratio
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        keep_aspect: bool,

        #[arg(short, long, value_enum, default_value_t = Algorithm::Bilinear)]
        algorithm: Algorithm,
    },

    /// Re-encode at the source resolution with a given quality
    Compress {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Encoder quality between 0.0 and 1.0
        #[arg(short, long, default_value_t = 0.8)]
        quality: f32,

        #[arg(short, long, value_enum, default_value_t = Format::Jpeg)]
        format: Format,

        /// Skip the lossless oxipng pass for PNG output
        #[arg(long)]
        no_optimize: bool,
    },

    /// Grow the encoded size to at least a target, padding with noise if needed
    Enhance {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target size in kilobytes
        #[arg(short, long, default_value_t = 100)]
        target: u64,

        #[arg(short, long, value_enum, default_value_t = Format::Jpeg)]
        format: Format,

        /// Quality the search starts from
        #[arg(long, default_value_t = 1.0)]
        start_quality: f32,

        /// Seed for reproducible noise padding
        #[arg(long)]
        seed: Option<u32>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl From<Algorithm> for ResizeAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Nearest => ResizeAlgorithm::Nearest,
            Algorithm::Bilinear => ResizeAlgorithm::Bilinear,
            Algorithm::Bicubic => ResizeAlgorithm::Bicubic,
            Algorithm::Lanczos3 => ResizeAlgorithm::Lanczos3,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    #[value(alias = "jpg")]
    Jpeg,
    Png,
    Webp,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Jpeg => OutputFormat::Jpeg,
            Format::Png => OutputFormat::Png,
            Format::Webp => OutputFormat::WebP,
        }
    }
}
