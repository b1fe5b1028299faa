// pixtune/src/processors/mod.rs
mod compressor;
mod enhancer;
mod loader;
mod noise;
mod resizer;

pub use compressor::{Compressor, Encoder};
pub use enhancer::{Enhancer, MAX_QUALITY, QUALITY_STEP};
pub use loader::Loader;
pub use noise::{HashNoise, NoisePadder, NoiseSource};
pub use resizer::{Resizer, RESIZE_OUTPUT_FORMAT};
