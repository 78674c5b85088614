//! JPEG encoding with optimized Huffman tables.
//!
//! The encoder always emits per-image Huffman tables instead of the standard
//! ones, which takes a second pass over the coefficients.

use jpeg_encoder::{ColorType, Encoder};
use thiserror::Error;

use crate::decode::DecodedImage;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// A side exceeds the 65535 pixels a JPEG frame header can express
    #[error("Image too large for JPEG: {width}x{height} (max 65535 per side)")]
    TooLarge { width: u32, height: u32 },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),

    /// The encoder reported success but wrote nothing
    #[error("JPEG encoder produced no output")]
    EmptyOutput,
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality, clamped to 1-100
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let (Ok(frame_width), Ok(frame_height)) = (u16::try_from(width), u16::try_from(height))
    else {
        return Err(EncodeError::TooLarge { width, height });
    };

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let mut bytes = Vec::new();
    let mut encoder = Encoder::new(&mut bytes, quality.clamp(1, 100));
    encoder.set_optimized_huffman_tables(true);
    encoder
        .encode(pixels, frame_width, frame_height, ColorType::Rgb)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    if bytes.is_empty() {
        return Err(EncodeError::EmptyOutput);
    }
    Ok(bytes)
}

/// Encode a decoded raster to JPEG bytes.
pub fn encode_image(image: &DecodedImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    encode_jpeg(&image.pixels, image.width, image.height, quality)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Vec<u8> {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push((x * 255 / width) as u8);
                pixels.push((y * 255 / height) as u8);
                pixels.push(((x ^ y) & 0xFF) as u8);
            }
        }
        pixels
    }

    #[test]
    fn test_encode_jpeg_markers() {
        let jpeg = encode_jpeg(&vec![128u8; 100 * 100 * 3], 100, 100, 85).unwrap();

        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_lower_quality_is_smaller_for_detailed_content() {
        let pixels = gradient(128, 128);

        let low_q = encode_jpeg(&pixels, 128, 128, 10).unwrap();
        let high_q = encode_jpeg(&pixels, 128, 128, 85).unwrap();

        assert!(low_q.len() < high_q.len());
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        let pixels = vec![128u8; 10 * 10 * 3];
        assert!(encode_jpeg(&pixels, 10, 10, 0).is_ok());
        assert!(encode_jpeg(&pixels, 10, 10, 255).is_ok());
    }

    #[test]
    fn test_encode_jpeg_invalid_pixel_data() {
        let short = vec![128u8; 99 * 100 * 3];
        assert!(matches!(
            encode_jpeg(&short, 100, 100, 85),
            Err(EncodeError::InvalidPixelData { .. })
        ));

        let long = vec![128u8; 101 * 100 * 3];
        assert!(matches!(
            encode_jpeg(&long, 100, 100, 85),
            Err(EncodeError::InvalidPixelData { .. })
        ));
    }

    #[test]
    fn test_encode_jpeg_zero_dimensions() {
        assert!(matches!(
            encode_jpeg(&[], 0, 100, 85),
            Err(EncodeError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            encode_jpeg(&[], 100, 0, 85),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    fn noise(width: u32, height: u32) -> Vec<u8> {
        let mut state = 0x2545_F491u32;
        (0..width * height * 3)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn test_optimized_tables_beat_standard_tables() {
        let pixels = noise(256, 256);
        let optimized = encode_jpeg(&pixels, 256, 256, 30).unwrap();

        let mut standard = Vec::new();
        Encoder::new(&mut standard, 30)
            .encode(&pixels, 256, 256, ColorType::Rgb)
            .unwrap();

        assert!(
            optimized.len() < standard.len(),
            "optimized {} >= standard {}",
            optimized.len(),
            standard.len()
        );
    }

    #[test]
    fn test_smaller_than_image_crate_baseline() {
        use image::codecs::jpeg::JpegEncoder;
        use image::{ExtendedColorType, ImageEncoder};

        let pixels = noise(256, 256);
        let ours = encode_jpeg(&pixels, 256, 256, 85).unwrap();

        let mut baseline = Vec::new();
        JpegEncoder::new_with_quality(&mut baseline, 85)
            .write_image(&pixels, 256, 256, ExtendedColorType::Rgb8)
            .unwrap();

        assert!(ours.len() < baseline.len());
        let decoded = crate::decode::decode_image(&ours).unwrap();
        assert_eq!(decoded.dimensions(), (256, 256));
    }

    #[test]
    fn test_encode_jpeg_too_large() {
        assert!(matches!(
            encode_jpeg(&[], 70_000, 1, 85),
            Err(EncodeError::TooLarge {
                width: 70_000,
                height: 1
            })
        ));
    }

    #[test]
    fn test_encode_single_pixel() {
        let jpeg = encode_jpeg(&[255, 0, 0], 1, 1, 85).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
        // Headers and tables alone are far larger than a handful of bytes
        assert!(jpeg.len() > 100);
    }

    #[test]
    fn test_encode_image_matches_encode_jpeg() {
        let img = DecodedImage::new(20, 10, gradient(20, 10));
        let a = encode_image(&img, 70).unwrap();
        let b = encode_jpeg(&img.pixels, 20, 10, 70).unwrap();
        assert_eq!(a, b);
    }
}
