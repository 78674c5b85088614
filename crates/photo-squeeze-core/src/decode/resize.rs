//! Image resampling used by the compression search.
//!
//! Resampling always uses Lanczos3 and returns a new raster.

use image::imageops::{self, FilterType};

use super::{DecodeError, DecodedImage};

/// Resize an image to exact dimensions with a Lanczos3 filter.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if either target dimension is zero,
/// or `DecodeError::CorruptedFile` if the pixel buffer does not match the
/// source dimensions.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    let view = image.as_rgb_view().ok_or_else(|| {
        DecodeError::CorruptedFile(format!(
            "pixel buffer of {} bytes does not match {}x{}",
            image.pixels.len(),
            image.width,
            image.height
        ))
    })?;

    Ok(DecodedImage::from_rgb_image(imageops::resize(
        &view,
        width,
        height,
        FilterType::Lanczos3,
    )))
}

/// Compute the dimensions of `width`x`height` scaled by `factor`.
///
/// Each side is truncated toward zero and then clamped to at least one
/// pixel, so the result is never a zero-area raster.
pub fn scale_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let scale = |dim: u32| -> u32 {
        let scaled = (f64::from(dim) * factor).floor();
        if scaled.is_finite() && scaled >= 1.0 {
            scaled.min(f64::from(u32::MAX)) as u32
        } else {
            1
        }
    };
    (scale(width), scale(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8); // R
                pixels.push(((y * 255) / height.max(1)) as u8); // G
                pixels.push(128); // B
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_resize_basic() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 50, 25).unwrap();

        assert_eq!(resized.dimensions(), (50, 25));
        assert_eq!(resized.pixels.len(), 50 * 25 * 3);
    }

    #[test]
    fn test_resize_same_dimensions() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 100, 50).unwrap();
        assert_eq!(resized, img);
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let img = create_test_image(100, 50);

        assert!(matches!(
            resize(&img, 0, 50),
            Err(DecodeError::InvalidDimensions { .. })
        ));
        assert!(resize(&img, 50, 0).is_err());
    }

    #[test]
    fn test_resize_mismatched_buffer_error() {
        let img = DecodedImage {
            width: 10,
            height: 10,
            pixels: vec![0u8; 12],
        };
        assert!(matches!(
            resize(&img, 5, 5),
            Err(DecodeError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_scale_dimensions_compounds() {
        assert_eq!(scale_dimensions(4000, 3000, 0.8), (3200, 2400));
        assert_eq!(scale_dimensions(4000, 3000, 0.8 * 0.8), (2560, 1920));
    }

    #[test]
    fn test_scale_dimensions_never_zero() {
        assert_eq!(scale_dimensions(1, 1, 0.8), (1, 1));
        assert_eq!(scale_dimensions(1000, 2, 0.1), (100, 1));
        assert_eq!(scale_dimensions(10, 10, 0.0), (1, 1));
    }
}
