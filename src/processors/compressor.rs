// pixtune/src/processors/compressor.rs
use crate::core::{
    CompressionSettings, ImageToolError, OutputFormat, ProcessedImageResult, Result, SourceImage,
};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use oxipng::{optimize_from_memory, Options};

/// Encodes a raster into bytes at a given format and quality.
///
/// [`Compressor`] is the production implementation; the enhancer is generic
/// over this so its quality search can be driven without real codecs.
pub trait Encoder {
    fn encode(&self, image: &SourceImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct Compressor {
    optimize_png: bool,
}

impl Compressor {
    pub fn new() -> Self {
        Self { optimize_png: false }
    }

    /// Runs PNG output through a lossless `oxipng` pass.
    pub fn with_png_optimization(mut self, optimize: bool) -> Self {
        self.optimize_png = optimize;
        self
    }

    /// Re-encodes at native resolution with the requested format and quality.
    pub fn compress(
        &self,
        image: &SourceImage,
        settings: &CompressionSettings,
    ) -> Result<ProcessedImageResult> {
        let bytes = self.encode(image, settings.format, settings.quality)?;
        let quality = settings.format.is_lossy().then_some(settings.quality);

        log::info!(
            "Compressed {}x{} image to {} ({} bytes, quality {:?})",
            image.width(),
            image.height(),
            settings.format,
            bytes.len(),
            quality
        );

        Ok(ProcessedImageResult::new(
            bytes,
            image.width(),
            image.height(),
            settings.format,
            quality,
        ))
    }

    fn encode_jpeg(&self, image: &SourceImage, quality: f32) -> Result<Vec<u8>> {
        // JPEG has no alpha channel.
        let rgb = RgbImage::from_fn(image.width(), image.height(), |x, y| {
            let p = image.get_pixel(x, y);
            Rgb([p[0], p[1], p[2]])
        });

        let mut buffer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, encoder_quality(quality));
        encoder
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(|e| ImageToolError::Encode(format!("JPEG encoding failed: {}", e)))?;

        Ok(buffer)
    }

    fn encode_png(&self, image: &SourceImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| ImageToolError::Encode(format!("PNG encoding failed: {}", e)))?;

        if self.optimize_png {
            return optimize_from_memory(&buffer, &Options::default())
                .map_err(|e| ImageToolError::Encode(format!("PNG optimization failed: {}", e)));
        }

        Ok(buffer)
    }

    /// The pure-Rust WebP encoder is lossless only, so quality below 1.0 is
    /// applied by quantizing RGB first. Fewer levels compress better.
    fn encode_webp(&self, image: &SourceImage, quality: f32) -> Result<Vec<u8>> {
        let quantized;
        let raster = if quality < 1.0 {
            let mut copy = image.clone();
            quantize_rgb(&mut copy, webp_levels(quality));
            quantized = copy;
            &quantized
        } else {
            image
        };

        let mut buffer = Vec::new();
        WebPEncoder::new_lossless(&mut buffer)
            .write_image(
                raster.as_raw(),
                raster.width(),
                raster.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| ImageToolError::Encode(format!("WebP encoding failed: {}", e)))?;

        Ok(buffer)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for Compressor {
    fn encode(&self, image: &SourceImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ImageToolError::Encode(format!(
                "Cannot encode a zero-area image ({}x{})",
                image.width(),
                image.height()
            )));
        }

        if !(0.0..=1.0).contains(&quality) {
            return Err(ImageToolError::Encode(format!(
                "Quality {} is outside [0, 1]",
                quality
            )));
        }

        match format {
            OutputFormat::Jpeg => self.encode_jpeg(image, quality),
            OutputFormat::Png => self.encode_png(image),
            OutputFormat::WebP => self.encode_webp(image, quality),
        }
    }
}

/// Maps a `[0, 1]` quality onto the encoders' `1..=100` scale.
fn encoder_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Palette size per channel for a WebP quality: 256 at full quality, biased
/// toward coarse palettes at the low end.
fn webp_levels(quality: f32) -> u16 {
    let q = encoder_quality(quality);
    if q >= 100 {
        return 256;
    }
    let normalized = q as f32 / 100.0;
    (2.0 + normalized * normalized * 254.0).round().clamp(2.0, 256.0) as u16
}

/// Snaps R, G and B to `levels` evenly spaced values; alpha is untouched.
fn quantize_rgb(image: &mut SourceImage, levels: u16) {
    if levels >= 256 {
        return;
    }
    let step = 255.0 / (levels as f32 - 1.0);
    for pixel in image.pixels_mut() {
        for channel in pixel.0[..3].iter_mut() {
            let bucket = (*channel as f32 / step).round();
            *channel = (bucket * step).round().clamp(0.0, 255.0) as u8;
        }
    }
}
