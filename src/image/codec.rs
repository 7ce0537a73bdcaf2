use super::RasterImage;
use crate::{Error, Result};
use image::codecs::jpeg::JpegEncoder;

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Decode any raster format the image crate recognises by its magic bytes.
pub fn decode(bytes: &[u8]) -> Result<RasterImage> {
    image::load_from_memory(bytes).map_err(Error::Decode)
}

/// Encode as baseline JPEG. JPEG carries no alpha, so pixels are flattened
/// to 8-bit RGB first.
pub fn encode(image: &RasterImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    rgb.write_with_encoder(encoder).map_err(Error::Encode)?;
    Ok(bytes)
}
