// pixtune/src/processors/loader.rs
use crate::core::{ImageDimensions, ImageInfo, ImageToolError, Result, SourceImage};
use crate::utils::image_format_to_string;
use image::ImageReader;
use std::io::Cursor;
use std::path::Path;

/// Reads raw bytes, probes dimensions and decodes into an RGBA8 raster.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    max_dimensions: Option<(u32, u32)>,
    max_input_bytes: Option<u64>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_dimensions = Some((width, height));
        self
    }

    pub fn with_max_input_bytes(mut self, limit: u64) -> Self {
        self.max_input_bytes = Some(limit);
        self
    }

    /// Reads an input file, enforcing the configured byte limit.
    pub fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        if !path.exists() {
            return Err(ImageToolError::InvalidParameter(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let len = path.metadata()?.len();
        if let Some(limit) = self.max_input_bytes {
            if len > limit {
                return Err(ImageToolError::MemoryLimitExceeded(format!(
                    "File size {} exceeds limit {}",
                    len, limit
                )));
            }
        }

        log::debug!("Reading {} ({} bytes)", path.display(), len);
        Ok(std::fs::read(path)?)
    }

    /// Reports the pixel dimensions of an encoded image from its header.
    pub fn probe(&self, data: &[u8]) -> Result<ImageDimensions> {
        let reader = Self::reader(data)?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ImageToolError::Decode(format!("Failed to read dimensions: {}", e)))?;

        Ok(ImageDimensions::new(width, height))
    }

    pub fn inspect(&self, data: &[u8]) -> Result<ImageInfo> {
        let reader = Self::reader(data)?;
        let format = reader
            .format()
            .map(image_format_to_string)
            .unwrap_or_else(|| "Unknown".to_string());
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ImageToolError::Decode(format!("Failed to read dimensions: {}", e)))?;

        let has_exif = match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
            Ok(_) => true,
            Err(exif::Error::NotFound(_)) => false,
            Err(e) => {
                log::debug!("Ignoring unreadable EXIF block: {}", e);
                false
            }
        };

        Ok(ImageInfo {
            dimensions: ImageDimensions::new(width, height),
            format,
            file_size: data.len() as u64,
            has_exif,
        })
    }

    pub fn load_from_bytes(&self, data: &[u8]) -> Result<SourceImage> {
        if data.is_empty() {
            return Err(ImageToolError::Decode("Input is empty".to_string()));
        }

        if let Some(limit) = self.max_input_bytes {
            if data.len() as u64 > limit {
                return Err(ImageToolError::MemoryLimitExceeded(format!(
                    "Input size {} exceeds limit {}",
                    data.len(),
                    limit
                )));
            }
        }

        // Check the header first so oversized images are rejected before a full decode.
        if let Some((max_w, max_h)) = self.max_dimensions {
            let ImageDimensions { width, height } = self.probe(data)?;
            if width > max_w || height > max_h {
                return Err(ImageToolError::MemoryLimitExceeded(format!(
                    "Image dimensions {}x{} exceed maximum {}x{}",
                    width, height, max_w, max_h
                )));
            }
        }

        let image = Self::reader(data)?
            .decode()
            .map_err(|e| ImageToolError::Decode(format!("Failed to decode image: {}", e)))?;

        let raster = image.into_rgba8();
        log::debug!(
            "Decoded image: {}x{} pixels",
            raster.width(),
            raster.height()
        );

        Ok(raster)
    }

    fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ImageToolError::Decode(format!("Failed to guess format: {}", e)))
    }
}
