mod cli;
mod core;
mod processors;
mod utils;

pub use cli::{Algorithm, Cli, Commands, Format};
pub use self::core::{
    validate_config, CompressionSettings, EnhanceSettings, ImageDimensions, ImageInfo,
    ImageProcessor, ImageToolError, OutputFormat, ProcessConfig, ProcessedImageResult,
    ResizeAlgorithm, ResizeSettings, Result, SourceImage,
};
pub use processors::{
    Compressor, Encoder, Enhancer, HashNoise, Loader, NoisePadder, NoiseSource, Resizer,
    MAX_QUALITY, QUALITY_STEP, RESIZE_OUTPUT_FORMAT,
};
pub use utils::{format_file_size, generate_output_path, sanitize_filename, size_change_percent};

pub mod prelude {
    pub use crate::{
        CompressionSettings, Compressor, EnhanceSettings, Enhancer, ImageProcessor, Loader,
        OutputFormat, ProcessConfig, ResizeAlgorithm, ResizeSettings, Resizer,
    };
}

// Re-export commonly used types
pub use image::RgbaImage;
