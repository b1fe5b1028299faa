// pixtune/src/core/mod.rs
mod processor;

pub use processor::ImageProcessor;

use image::RgbaImage;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Decoded raster every operation works on: row-major RGBA8.
pub type SourceImage = RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeAlgorithm {
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
    Lanczos3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    /// Short lowercase name, as used in settings and result descriptors.
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }

    /// Whether the encoder honours the quality parameter for this format.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg | OutputFormat::WebP)
    }

    pub fn from_image_format(format: image::ImageFormat) -> Result<Self> {
        match format {
            image::ImageFormat::Jpeg => Ok(OutputFormat::Jpeg),
            image::ImageFormat::Png => Ok(OutputFormat::Png),
            image::ImageFormat::WebP => Ok(OutputFormat::WebP),
            other => Err(ImageToolError::UnsupportedFormat(format!("{:?}", other))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = ImageToolError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = normalized.strip_prefix("image/").unwrap_or(&normalized);
        match normalized {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(ImageToolError::UnsupportedFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}

/// Target dimensions for the resizer.
///
/// `maintain_aspect_ratio` is advisory: callers apply it while building the
/// settings (see [`ResizeSettings::from_width`]), the resizer always produces
/// exactly `width x height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSettings {
    pub width: u32,
    pub height: u32,
    pub maintain_aspect_ratio: bool,
}

impl ResizeSettings {
    pub fn new(width: u32, height: u32, maintain_aspect_ratio: bool) -> Self {
        Self {
            width,
            height,
            maintain_aspect_ratio,
        }
    }

    /// Settings for a new width, deriving the height from `original` when
    /// the aspect ratio is kept.
    pub fn from_width(original: ImageDimensions, width: u32, maintain_aspect_ratio: bool) -> Self {
        let height = if maintain_aspect_ratio && original.width > 0 && original.height > 0 {
            ((width as f64 / original.aspect_ratio()).round() as u32).max(1)
        } else {
            original.height
        };
        Self::new(width, height, maintain_aspect_ratio)
    }

    /// Settings for a new height, deriving the width from `original` when
    /// the aspect ratio is kept.
    pub fn from_height(original: ImageDimensions, height: u32, maintain_aspect_ratio: bool) -> Self {
        let width = if maintain_aspect_ratio && original.width > 0 && original.height > 0 {
            ((height as f64 * original.aspect_ratio()).round() as u32).max(1)
        } else {
            original.width
        };
        Self::new(width, height, maintain_aspect_ratio)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ImageToolError::InvalidParameter(format!(
                "Resize dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionSettings {
    /// Encoder quality in `[0, 1]`, ignored by lossless formats.
    pub quality: f32,
    pub format: OutputFormat,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            quality: 0.8,
            format: OutputFormat::Jpeg,
        }
    }
}

impl CompressionSettings {
    /// Up-front check for callers; the encoder itself reports an
    /// out-of-range quality as [`ImageToolError::Encode`].
    pub fn validate(&self) -> Result<()> {
        validate_quality(self.quality)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnhanceSettings {
    /// Desired minimum output size in kilobytes (1 KB = 1024 bytes).
    pub target_size_kb: u64,
    pub format: OutputFormat,
}

impl Default for EnhanceSettings {
    fn default() -> Self {
        Self {
            target_size_kb: 100,
            format: OutputFormat::Jpeg,
        }
    }
}

impl EnhanceSettings {
    pub fn target_bytes(&self) -> u64 {
        self.target_size_kb.saturating_mul(1024)
    }
}

/// Encoded output of any operation. Immutable once built; `size` always
/// matches the length of the byte buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImageResult {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    format: OutputFormat,
    quality: Option<f32>,
}

impl ProcessedImageResult {
    pub fn new(
        bytes: Vec<u8>,
        width: u32,
        height: u32,
        format: OutputFormat,
        quality: Option<f32>,
    ) -> Self {
        Self {
            bytes,
            width,
            height,
            format,
            quality: quality.map(|q| q.clamp(0.0, 1.0)),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.width, self.height)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn quality(&self) -> Option<f32> {
        self.quality
    }
}

/// Summary of an input image, as shown before processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub dimensions: ImageDimensions,
    pub format: String,
    pub file_size: u64,
    pub has_exif: bool,
}

#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub algorithm: ResizeAlgorithm,
    pub optimize_png: bool,
    pub max_input_bytes: Option<u64>,
    pub max_dimensions: Option<(u32, u32)>,
    pub start_quality: f32,
    pub noise_seed: Option<u32>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            algorithm: ResizeAlgorithm::Bilinear,
            optimize_png: true,
            max_input_bytes: None,
            max_dimensions: None,
            start_quality: 1.0,
            noise_seed: None,
        }
    }
}

impl ProcessConfig {
    pub fn validate(&self) -> Result<()> {
        validate_quality(self.start_quality)?;

        if self.max_input_bytes == Some(0) {
            return Err(ImageToolError::InvalidParameter(
                "Maximum input size must be positive".to_string(),
            ));
        }

        if let Some((w, h)) = self.max_dimensions {
            if w == 0 || h == 0 {
                return Err(ImageToolError::InvalidParameter(
                    "Maximum dimensions must be positive".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn validate_quality(quality: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&quality) {
        return Err(ImageToolError::InvalidParameter(format!(
            "Quality must be between 0.0 and 1.0, got {}",
            quality
        )));
    }
    Ok(())
}

#[derive(Error, Debug)]
pub enum ImageToolError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Memory limit exceeded: {0}")]
    MemoryLimitExceeded(String),
}

pub type Result<T> = std::result::Result<T, ImageToolError>;

pub fn validate_config(config: &ProcessConfig) -> Result<()> {
    config.validate()
}
