// pixtune/src/processors/resizer.rs
use super::compressor::Encoder;
use crate::core::{
    ImageToolError, OutputFormat, ProcessedImageResult, ResizeAlgorithm, ResizeSettings, Result,
    SourceImage,
};
use image::imageops::{self, FilterType};

/// Resampled output is always encoded as PNG, whatever format the caller
/// had in mind.
pub const RESIZE_OUTPUT_FORMAT: OutputFormat = OutputFormat::Png;

pub struct Resizer {
    algorithm: ResizeAlgorithm,
}

impl Resizer {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Resamples to exactly `settings.width x settings.height`.
    pub fn resize(&self, image: &SourceImage, settings: &ResizeSettings) -> Result<SourceImage> {
        if settings.width == 0 || settings.height == 0 {
            return Err(ImageToolError::Encode(format!(
                "Cannot produce a zero-area image ({}x{})",
                settings.width, settings.height
            )));
        }

        if settings.width == image.width() && settings.height == image.height() {
            log::debug!("Image dimensions unchanged, skipping resample");
            return Ok(image.clone());
        }

        log::debug!(
            "Resizing image from {}x{} to {}x{} ({:?})",
            image.width(),
            image.height(),
            settings.width,
            settings.height,
            self.algorithm
        );

        Ok(imageops::resize(
            image,
            settings.width,
            settings.height,
            self.filter_type(),
        ))
    }

    /// Resamples and encodes losslessly with `encoder`.
    pub fn process<E: Encoder + ?Sized>(
        &self,
        image: &SourceImage,
        settings: &ResizeSettings,
        encoder: &E,
    ) -> Result<ProcessedImageResult> {
        let resized = self.resize(image, settings)?;
        let bytes = encoder.encode(&resized, RESIZE_OUTPUT_FORMAT, 1.0)?;

        log::info!(
            "Resized to {}x{} ({} bytes)",
            resized.width(),
            resized.height(),
            bytes.len()
        );

        Ok(ProcessedImageResult::new(
            bytes,
            resized.width(),
            resized.height(),
            RESIZE_OUTPUT_FORMAT,
            None,
        ))
    }

    fn filter_type(&self) -> FilterType {
        match self.algorithm {
            ResizeAlgorithm::Nearest => FilterType::Nearest,
            ResizeAlgorithm::Bilinear => FilterType::Triangle,
            ResizeAlgorithm::Bicubic => FilterType::CatmullRom,
            ResizeAlgorithm::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(ResizeAlgorithm::default())
    }
}
