use super::{codec, resize, CompressionOptions, CompressionResult, ImageService};
use crate::{Error, Result};
use async_trait::async_trait;
use image::GenericImageView;

/// Decode, shrink and re-encode as JPEG.
pub struct ImageProcessor {
    options: CompressionOptions,
}

impl ImageProcessor {
    pub fn new(options: CompressionOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    fn compress_sync(raw: &[u8], options: CompressionOptions) -> Result<CompressionResult> {
        let source = codec::decode(raw)?;
        let (source_width, source_height) = source.dimensions();
        let (width, height) =
            resize::target_dimensions(source_width, source_height, options.scale_divisor)?;

        let resized = resize::resize(&source, width, height, options.filter);
        drop(source);

        let bytes = codec::encode(&resized, options.jpeg_quality)?;
        tracing::debug!(
            "Compressed {}x{} ({} bytes) to {}x{} ({} bytes)",
            source_width,
            source_height,
            raw.len(),
            width,
            height,
            bytes.len()
        );

        Ok(CompressionResult {
            bytes,
            content_type: codec::JPEG_CONTENT_TYPE,
            width,
            height,
        })
    }
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self {
            options: CompressionOptions::default(),
        }
    }
}

#[async_trait]
impl ImageService for ImageProcessor {
    async fn compress(&self, raw: &[u8]) -> Result<CompressionResult> {
        let raw = raw.to_vec();
        let options = self.options;

        tokio::task::spawn_blocking(move || Self::compress_sync(&raw, options))
            .await
            .map_err(|e| Error::Invariant(format!("Image processing task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn create_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), format)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_compress_halves_dimensions() {
        let processor = ImageProcessor::default();
        let source = create_test_image(200, 100, ImageFormat::Png);

        let result = processor.compress(&source).await.unwrap();

        assert_eq!(result.content_type, "image/jpeg");
        assert_eq!((result.width, result.height), (100, 50));
        let decoded = image::load_from_memory(&result.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (100, 50));
    }

    #[tokio::test]
    async fn test_compress_floors_odd_dimensions() {
        let processor = ImageProcessor::default();
        let source = create_test_image(101, 101, ImageFormat::Jpeg);

        let result = processor.compress(&source).await.unwrap();

        let decoded = image::load_from_memory(&result.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (50, 50));
    }

    #[tokio::test]
    async fn test_compress_is_deterministic() {
        let processor = ImageProcessor::default();
        let source = create_test_image(64, 48, ImageFormat::Png);

        let first = processor.compress(&source).await.unwrap();
        let second = processor.compress(&source).await.unwrap();

        assert_eq!(first.bytes, second.bytes);
    }

    #[tokio::test]
    async fn test_compress_rejects_one_pixel_image() {
        let processor = ImageProcessor::default();
        let source = create_test_image(1, 1, ImageFormat::Png);

        let err = processor.compress(&source).await.unwrap_err();
        assert!(matches!(err, Error::Degenerate { width: 0, height: 0 }));
    }

    #[tokio::test]
    async fn test_compress_smallest_shrinkable_image() {
        let processor = ImageProcessor::default();
        let source = create_test_image(2, 2, ImageFormat::Png);

        let result = processor.compress(&source).await.unwrap();
        assert_eq!((result.width, result.height), (1, 1));
    }

    #[tokio::test]
    async fn test_compress_rejects_undecodable_input() {
        let processor = ImageProcessor::default();

        let err = processor.compress(b"not an image").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_custom_divisor() {
        let options = CompressionOptions {
            scale_divisor: 4,
            ..Default::default()
        };
        let processor = ImageProcessor::new(options).unwrap();
        let source = create_test_image(100, 60, ImageFormat::Png);

        let result = processor.compress(&source).await.unwrap();
        assert_eq!((result.width, result.height), (25, 15));
    }

    #[test]
    fn test_new_rejects_invalid_options() {
        let options = CompressionOptions {
            scale_divisor: 0,
            ..Default::default()
        };
        assert!(ImageProcessor::new(options).is_err());
    }
}
