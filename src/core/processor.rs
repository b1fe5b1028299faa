// pixtune/src/core/processor.rs
use super::{
    CompressionSettings, EnhanceSettings, ImageDimensions, ImageInfo, ProcessConfig,
    ProcessedImageResult, ResizeSettings, Result,
};
use crate::processors::{Compressor, Enhancer, Loader, Resizer};
use std::path::Path;

/// Request/response entry point: every operation takes encoded bytes plus
/// settings, decodes once, and returns a single result or error.
pub struct ImageProcessor {
    config: ProcessConfig,
    loader: Loader,
    resizer: Resizer,
    compressor: Compressor,
    enhancer: Enhancer<Compressor>,
}

impl ImageProcessor {
    pub fn new(config: ProcessConfig) -> Self {
        let mut loader = Loader::new();
        if let Some(limit) = config.max_input_bytes {
            loader = loader.with_max_input_bytes(limit);
        }
        if let Some((width, height)) = config.max_dimensions {
            loader = loader.with_max_dimensions(width, height);
        }

        let compressor = Compressor::new().with_png_optimization(config.optimize_png);

        // Padding output must not be shrunk again, so the enhancer encodes plainly.
        let mut enhancer =
            Enhancer::with_encoder(Compressor::new()).with_start_quality(config.start_quality);
        if let Some(seed) = config.noise_seed {
            enhancer = enhancer.with_noise_seed(seed);
        }

        Self {
            resizer: Resizer::new(config.algorithm),
            config,
            loader,
            compressor,
            enhancer,
        }
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    pub fn read_input<P: AsRef<Path>>(&self, path: P) -> Result<Vec<u8>> {
        self.loader.read_file(path.as_ref())
    }

    pub fn probe(&self, data: &[u8]) -> Result<ImageDimensions> {
        self.loader.probe(data)
    }

    pub fn inspect(&self, data: &[u8]) -> Result<ImageInfo> {
        self.loader.inspect(data)
    }

    pub fn resize(&self, data: &[u8], settings: &ResizeSettings) -> Result<ProcessedImageResult> {
        let image = self.loader.load_from_bytes(data)?;
        // Resized output is a plain lossless encode, never oxipng-optimized.
        self.resizer.process(&image, settings, &Compressor::new())
    }

    pub fn compress(
        &self,
        data: &[u8],
        settings: &CompressionSettings,
    ) -> Result<ProcessedImageResult> {
        let image = self.loader.load_from_bytes(data)?;
        self.compressor.compress(&image, settings)
    }

    pub fn enhance(&self, data: &[u8], settings: &EnhanceSettings) -> Result<ProcessedImageResult> {
        let image = self.loader.load_from_bytes(data)?;
        self.enhancer.enhance(&image, settings)
    }
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new(ProcessConfig::default())
    }
}
