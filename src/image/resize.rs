use super::RasterImage;
use crate::{Error, Result};
use image::imageops::FilterType;

/// Output size for a source of `width` x `height`: both axes divided by
/// `divisor`, rounding down. Fails if either axis would collapse to zero.
pub fn target_dimensions(width: u32, height: u32, divisor: u32) -> Result<(u32, u32)> {
    if divisor == 0 {
        return Err(Error::Config("scale divisor must be at least 1".to_string()));
    }
    let (target_width, target_height) = (width / divisor, height / divisor);

    if target_width == 0 || target_height == 0 {
        return Err(Error::Degenerate {
            width: target_width,
            height: target_height,
        });
    }

    Ok((target_width, target_height))
}

/// Resample to exactly `width` x `height`; no cropping.
pub fn resize(image: &RasterImage, width: u32, height: u32, filter: FilterType) -> RasterImage {
    image.resize_exact(width, height, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};

    #[test]
    fn test_halving_floors_odd_sizes() {
        assert_eq!(target_dimensions(101, 101, 2).unwrap(), (50, 50));
        assert_eq!(target_dimensions(200, 100, 2).unwrap(), (100, 50));
        assert_eq!(target_dimensions(3, 2, 2).unwrap(), (1, 1));
    }

    #[test]
    fn test_other_divisors() {
        assert_eq!(target_dimensions(1000, 750, 4).unwrap(), (250, 187));
        assert_eq!(target_dimensions(9, 9, 1).unwrap(), (9, 9));
    }

    #[test]
    fn test_one_pixel_source_is_degenerate() {
        let err = target_dimensions(1, 1, 2).unwrap_err();
        assert!(matches!(err, Error::Degenerate { width: 0, height: 0 }));
    }

    #[test]
    fn test_single_collapsed_axis_is_degenerate() {
        let err = target_dimensions(400, 1, 2).unwrap_err();
        assert!(matches!(err, Error::Degenerate { width: 200, height: 0 }));
    }

    #[test]
    fn test_zero_divisor_rejected() {
        assert!(matches!(
            target_dimensions(10, 10, 0).unwrap_err(),
            Error::Config(_)
        ));
    }

    #[test]
    fn test_resize_exact_dimensions() {
        let img = RasterImage::ImageRgb8(RgbImage::new(31, 17));
        let resized = resize(&img, 15, 8, FilterType::Lanczos3);
        assert_eq!(resized.dimensions(), (15, 8));
    }
}
