//! Image decoding, downscaling and JPEG re-encoding
//!
//! Shrinks source images by a fixed divisor on both axes and recompresses
//! them to JPEG for storage under their original key.

pub mod codec;
pub mod mock;
pub mod processor;
pub mod resize;

pub use codec::JPEG_CONTENT_TYPE;
pub use mock::MockImageProcessor;
pub use processor::ImageProcessor;

use crate::{Error, Result};
use async_trait::async_trait;
use image::imageops::FilterType;

/// Decoded in-memory pixels with known dimensions.
pub type RasterImage = image::DynamicImage;

#[derive(Debug, Clone, Copy)]
pub struct CompressionOptions {
    /// Both axes are divided by this value, rounding down.
    pub scale_divisor: u32,
    pub filter: FilterType,
    pub jpeg_quality: u8,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            scale_divisor: 2,
            filter: FilterType::Lanczos3,
            jpeg_quality: 75,
        }
    }
}

impl CompressionOptions {
    pub fn validate(&self) -> Result<()> {
        if self.scale_divisor == 0 {
            return Err(Error::Config("scale divisor must be at least 1".to_string()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::Config(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait ImageService: Send + Sync {
    async fn compress(&self, raw: &[u8]) -> Result<CompressionResult>;
}
