// pixtune/src/processors/enhancer.rs
//! Size-targeting enhancement.
//!
//! The enhancer encodes at `start_quality` and, while the output is smaller
//! than the target, raises quality by 0.1 until it reaches 1.0. If even 1.0
//! falls short, a single pass of [`NoisePadder`] is applied and the image is
//! encoded once more at 1.0; that result is returned whether or not it met
//! the target.
//!
//! The default start is 1.0, so with default settings the search performs a
//! single encode before deciding. That reproduces the established behaviour
//! of the tool. A lower start (see [`Enhancer::with_start_quality`]) turns it
//! into an upward search for the lowest quality step that meets the target,
//! which is most likely what the step logic was meant for.

use super::compressor::{Compressor, Encoder};
use super::noise::{HashNoise, NoisePadder, NoiseSource};
use crate::core::{
    EnhanceSettings, ImageToolError, ProcessedImageResult, Result, SourceImage,
};

pub const MAX_QUALITY: f32 = 1.0;
pub const QUALITY_STEP: f32 = 0.1;

pub struct Enhancer<E = Compressor> {
    encoder: E,
    padder: NoisePadder,
    start_quality: f32,
    noise_seed: Option<u32>,
}

impl Enhancer<Compressor> {
    pub fn new() -> Self {
        Self::with_encoder(Compressor::new())
    }
}

impl Default for Enhancer<Compressor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Encoder> Enhancer<E> {
    pub fn with_encoder(encoder: E) -> Self {
        Self {
            encoder,
            padder: NoisePadder::new(),
            start_quality: MAX_QUALITY,
            noise_seed: None,
        }
    }

    pub fn with_start_quality(mut self, quality: f32) -> Self {
        self.start_quality = quality;
        self
    }

    /// Fixes the noise stream used by the fallback so results are reproducible.
    pub fn with_noise_seed(mut self, seed: u32) -> Self {
        self.noise_seed = Some(seed);
        self
    }

    pub fn enhance(
        &self,
        image: &SourceImage,
        settings: &EnhanceSettings,
    ) -> Result<ProcessedImageResult> {
        let mut noise = match self.noise_seed {
            Some(seed) => HashNoise::new(seed),
            None => HashNoise::from_entropy(),
        };
        self.enhance_with_noise(image, settings, &mut noise)
    }

    pub fn enhance_with_noise<N: NoiseSource + ?Sized>(
        &self,
        image: &SourceImage,
        settings: &EnhanceSettings,
        noise: &mut N,
    ) -> Result<ProcessedImageResult> {
        if !(0.0..=MAX_QUALITY).contains(&self.start_quality) {
            return Err(ImageToolError::InvalidParameter(format!(
                "Start quality must be between 0.0 and 1.0, got {}",
                self.start_quality
            )));
        }

        let target = settings.target_bytes();
        let mut quality = self.start_quality;

        loop {
            let bytes = self.encoder.encode(image, settings.format, quality)?;
            log::debug!(
                "Enhance attempt at quality {:.1}: {} bytes (target {})",
                quality,
                bytes.len(),
                target
            );

            if bytes.len() as u64 >= target {
                log::info!(
                    "Reached target {} bytes at quality {:.1} ({} bytes)",
                    target,
                    quality,
                    bytes.len()
                );
                return Ok(self.result(image, settings, bytes, quality));
            }

            if quality >= MAX_QUALITY {
                break;
            }
            quality = next_quality(quality);
        }

        let mut padded = image.clone();
        self.padder.apply(&mut padded, noise);
        let bytes = self.encoder.encode(&padded, settings.format, MAX_QUALITY)?;

        if (bytes.len() as u64) < target {
            log::warn!(
                "Noise padding reached {} bytes, short of target {}",
                bytes.len(),
                target
            );
        } else {
            log::info!("Noise padding reached {} bytes (target {})", bytes.len(), target);
        }

        Ok(self.result(image, settings, bytes, MAX_QUALITY))
    }

    fn result(
        &self,
        image: &SourceImage,
        settings: &EnhanceSettings,
        bytes: Vec<u8>,
        quality: f32,
    ) -> ProcessedImageResult {
        ProcessedImageResult::new(
            bytes,
            image.width(),
            image.height(),
            settings.format,
            Some(quality),
        )
    }
}

/// One step up, kept on exact tenths and capped at [`MAX_QUALITY`].
fn next_quality(quality: f32) -> f32 {
    (((quality + QUALITY_STEP) * 10.0).round() / 10.0).min(MAX_QUALITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OutputFormat;
    use image::{Rgba, RgbaImage};
    use std::sync::Mutex;

    /// Encoder that returns buffers sized by a function of quality and records
    /// every call, including whether the raster had been perturbed.
    struct ScriptedEncoder<F: Fn(f32) -> usize> {
        size_at: F,
        calls: Mutex<Vec<(f32, bool)>>,
        pristine: Rgba<u8>,
    }

    impl<F: Fn(f32) -> usize> ScriptedEncoder<F> {
        fn new(size_at: F) -> Self {
            Self {
                size_at,
                calls: Mutex::new(Vec::new()),
                pristine: Rgba([128, 128, 128, 255]),
            }
        }

        fn calls(&self) -> Vec<(f32, bool)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl<F: Fn(f32) -> usize> Encoder for &ScriptedEncoder<F> {
        fn encode(&self, image: &SourceImage, _format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
            let perturbed = image.pixels().any(|p| *p != self.pristine);
            self.calls.lock().unwrap().push((quality, perturbed));
            let extra = if perturbed { 10 } else { 0 };
            Ok(vec![0; (self.size_at)(quality) + extra])
        }
    }

    struct Constant(f64);

    impl NoiseSource for Constant {
        fn next_noise(&mut self) -> f64 {
            self.0
        }
    }

    fn grey(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]))
    }

    fn settings(target_size_kb: u64) -> EnhanceSettings {
        EnhanceSettings {
            target_size_kb,
            format: OutputFormat::Jpeg,
        }
    }

    #[test]
    fn steps_stay_on_tenths() {
        let mut q = 0.0;
        let mut seen = vec![q];
        while q < MAX_QUALITY {
            q = next_quality(q);
            seen.push(q);
        }
        assert_eq!(seen.len(), 11);
        assert_eq!(seen[3], 0.3);
        assert_eq!(*seen.last().unwrap(), 1.0);
        assert_eq!(next_quality(0.95), 1.0);
    }

    #[test]
    fn default_start_stops_after_one_encode_when_target_met() {
        // 2,000,000 bytes at full quality against a 1500 KB target.
        let encoder = ScriptedEncoder::new(|q| (q * 2_000_000.0) as usize);
        let enhancer = Enhancer::with_encoder(&encoder);

        let result = enhancer
            .enhance_with_noise(&grey(10, 10), &settings(1500), &mut Constant(0.5))
            .unwrap();

        assert_eq!(result.quality(), Some(1.0));
        assert!(result.size() >= 1_536_000);
        assert_eq!(encoder.calls(), vec![(1.0, false)]);
    }

    #[test]
    fn low_start_climbs_to_first_sufficient_step() {
        let encoder = ScriptedEncoder::new(|q| (q * 2_000_000.0) as usize);
        let enhancer = Enhancer::with_encoder(&encoder).with_start_quality(0.2);

        let result = enhancer
            .enhance_with_noise(&grey(10, 10), &settings(1500), &mut Constant(0.5))
            .unwrap();

        // 0.7 * 2,000,000 = 1,400,000 < 1,536,000 <= 0.8 * 2,000,000
        assert_eq!(result.quality(), Some(0.8));
        assert!(result.size() >= 1_536_000);
        let qualities: Vec<f32> = encoder.calls().iter().map(|(q, _)| *q).collect();
        assert_eq!(qualities, vec![0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]);
    }

    #[test]
    fn falls_back_to_single_noise_pass() {
        let encoder = ScriptedEncoder::new(|_| 100);
        let enhancer = Enhancer::with_encoder(&encoder);

        let result = enhancer
            .enhance_with_noise(&grey(4, 4), &settings(1), &mut Constant(0.7))
            .unwrap();

        assert_eq!(result.quality(), Some(1.0));
        assert_eq!(result.size(), 110);
        assert_eq!(encoder.calls(), vec![(1.0, false), (1.0, true)]);
        assert_eq!((result.width(), result.height()), (4, 4));
    }

    #[test]
    fn fallback_after_full_climb_encodes_each_step_once() {
        let encoder = ScriptedEncoder::new(|_| 10);
        let enhancer = Enhancer::with_encoder(&encoder).with_start_quality(0.0);

        enhancer
            .enhance_with_noise(&grey(2, 2), &settings(5), &mut Constant(-0.7))
            .unwrap();

        let calls = encoder.calls();
        assert_eq!(calls.len(), 12);
        assert!(calls[..11].iter().all(|(_, perturbed)| !perturbed));
        assert_eq!(calls[11], (1.0, true));
    }

    #[test]
    fn zero_target_is_met_immediately() {
        let encoder = ScriptedEncoder::new(|_| 0);
        let enhancer = Enhancer::with_encoder(&encoder).with_start_quality(0.5);

        let result = enhancer
            .enhance_with_noise(&grey(1, 1), &settings(0), &mut Constant(0.0))
            .unwrap();

        assert_eq!(result.quality(), Some(0.5));
        assert_eq!(encoder.calls().len(), 1);
    }

    #[test]
    fn rejects_start_quality_outside_unit_range() {
        let encoder = ScriptedEncoder::new(|_| 0);
        let enhancer = Enhancer::with_encoder(&encoder).with_start_quality(1.5);
        let err = enhancer
            .enhance_with_noise(&grey(1, 1), &settings(1), &mut Constant(0.0))
            .unwrap_err();
        assert!(matches!(err, ImageToolError::InvalidParameter(_)));
        assert!(encoder.calls().is_empty());
    }

    #[test]
    fn real_encoder_pads_flat_image() {
        let enhancer = Enhancer::new().with_noise_seed(1);
        let image = grey(64, 64);
        let result = enhancer
            .enhance(
                &image,
                &EnhanceSettings {
                    target_size_kb: 10_000,
                    format: OutputFormat::Png,
                },
            )
            .unwrap();

        let plain = Compressor::new()
            .encode(&image, OutputFormat::Png, 1.0)
            .unwrap();

        assert_eq!(result.quality(), Some(1.0));
        assert_eq!(result.format(), OutputFormat::Png);
        assert!(result.size() > plain.len() as u64);

        let decoded = image::load_from_memory(result.bytes()).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (64, 64));
        for pixel in decoded.pixels() {
            for c in 0..3 {
                assert!((pixel[c] as i16 - 128).abs() <= 1);
            }
            assert_eq!(pixel[3], 255);
        }
    }
}
