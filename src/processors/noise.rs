// pixtune/src/processors/noise.rs
use crate::core::SourceImage;

/// A stream of perturbations in the open interval `(-1, 1)`.
pub trait NoiseSource {
    fn next_noise(&mut self) -> f64;
}

/// Counter-based generator: each draw is the Wang hash of a running counter
/// mixed with the seed, so a given seed always replays the same stream.
#[derive(Debug, Clone)]
pub struct HashNoise {
    hashed_seed: u32,
    counter: u32,
}

impl HashNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            hashed_seed: wang_hash(seed),
            counter: 0,
        }
    }

    /// Seeds from the operating system, falling back to the clock.
    pub fn from_entropy() -> Self {
        let mut buf = [0u8; 4];
        let seed = match getrandom::getrandom(&mut buf) {
            Ok(()) => u32::from_le_bytes(buf),
            Err(e) => {
                log::debug!("OS entropy unavailable ({}), seeding from clock", e);
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                    .unwrap_or(0)
            }
        };
        Self::new(seed)
    }
}

impl NoiseSource for HashNoise {
    fn next_noise(&mut self) -> f64 {
        let value = wang_hash(self.counter ^ self.hashed_seed);
        self.counter = self.counter.wrapping_add(1);
        // Bucket centres keep the result strictly inside (-1, 1).
        (value as f64 + 0.5) / 4_294_967_296.0 * 2.0 - 1.0
    }
}

#[inline]
fn wang_hash(mut x: u32) -> u32 {
    x = (x ^ 61) ^ (x >> 16);
    x = x.wrapping_mul(9);
    x = x ^ (x >> 4);
    x = x.wrapping_mul(0x27d4eb2d);
    x = x ^ (x >> 15);
    x
}

/// Adds sub-level noise to the colour channels to raise encoded entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoisePadder;

impl NoisePadder {
    pub fn new() -> Self {
        Self
    }

    /// Perturbs R, G and B of every pixel once with an independent draw from
    /// `noise`; alpha is left alone. Each channel moves by at most one level.
    pub fn apply<N: NoiseSource + ?Sized>(&self, image: &mut SourceImage, noise: &mut N) {
        for pixel in image.pixels_mut() {
            for channel in pixel.0[..3].iter_mut() {
                let perturbed = (*channel as f64 + noise.next_noise()).round();
                *channel = perturbed.clamp(0.0, 255.0) as u8;
            }
        }

        log::debug!(
            "Applied noise padding to {}x{} raster",
            image.width(),
            image.height()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    struct Fixed(Vec<f64>, usize);

    impl NoiseSource for Fixed {
        fn next_noise(&mut self) -> f64 {
            let value = self.0[self.1 % self.0.len()];
            self.1 += 1;
            value
        }
    }

    #[test]
    fn hash_noise_stays_in_open_interval() {
        let mut noise = HashNoise::new(7);
        for _ in 0..100_000 {
            let n = noise.next_noise();
            assert!(n > -1.0 && n < 1.0, "{} out of range", n);
        }
    }

    #[test]
    fn same_seed_replays_stream() {
        let mut a = HashNoise::new(42);
        let mut b = HashNoise::new(42);
        let mut c = HashNoise::new(43);
        let xs: Vec<f64> = (0..16).map(|_| a.next_noise()).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.next_noise()).collect();
        let zs: Vec<f64> = (0..16).map(|_| c.next_noise()).collect();
        assert_eq!(xs, ys);
        assert_ne!(xs, zs);
    }

    #[test]
    fn perturbs_colour_channels_independently() {
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([100, 100, 100, 128]));
        let mut noise = Fixed(vec![0.9, -0.9, 0.2], 0);
        NoisePadder::new().apply(&mut image, &mut noise);
        assert_eq!(image.get_pixel(0, 0), &Rgba([101, 99, 100, 128]));
        assert_eq!(noise.1, 3);
    }

    #[test]
    fn clamps_at_channel_bounds() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([0, 255, 0, 255]));
        let mut noise = Fixed(vec![-0.99, 0.99, 0.99], 0);
        NoisePadder::new().apply(&mut image, &mut noise);
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 255, 1, 255]));
        assert_eq!(image.get_pixel(1, 0), &Rgba([0, 255, 1, 255]));
    }

    #[test]
    fn every_channel_moves_at_most_one_level() {
        let original = RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([(x * 4) as u8, (y * 4) as u8, if x % 2 == 0 { 0 } else { 255 }, (x + y) as u8])
        });
        let mut padded = original.clone();
        NoisePadder::new().apply(&mut padded, &mut HashNoise::from_entropy());

        for (before, after) in original.pixels().zip(padded.pixels()) {
            for c in 0..3 {
                assert!((before[c] as i16 - after[c] as i16).abs() <= 1);
            }
            assert_eq!(before[3], after[3]);
        }
    }
}
