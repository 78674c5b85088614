//! WASM-compatible wrapper types for compression results.
//!
//! This module provides JavaScript-friendly types that wrap the core
//! photo-squeeze types.

use photo_squeeze_core::CompressedArtifact;
use wasm_bindgen::prelude::*;

/// A compressed photo wrapper for JavaScript.
///
/// # Memory Management
///
/// The encoded bytes live in WASM memory. `bytes()` copies them into a
/// JavaScript `Uint8Array`, so call it once and keep the result.
#[wasm_bindgen]
pub struct JsCompressedArtifact {
    inner: CompressedArtifact,
}

#[wasm_bindgen]
impl JsCompressedArtifact {
    /// Encoded JPEG bytes as a Uint8Array (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }

    /// Encoded size in bytes
    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// Width of the encoded image in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Height of the encoded image in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// JPEG quality the bytes were encoded with
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> u8 {
        self.inner.quality
    }

    /// Cumulative downscale relative to the uploaded image (1.0 = untouched)
    #[wasm_bindgen(getter)]
    pub fn scale_factor(&self) -> f64 {
        self.inner.scale_factor
    }

    /// Whether the bytes fit within the requested ceiling.
    ///
    /// When false the bytes are the smallest attempt and the caller decides
    /// whether to reject them.
    #[wasm_bindgen(getter)]
    pub fn met_ceiling(&self) -> bool {
        self.inner.met_ceiling
    }

    /// Number of encodes the search performed
    #[wasm_bindgen(getter)]
    pub fn attempt_count(&self) -> usize {
        self.inner.attempts.len()
    }
}

impl JsCompressedArtifact {
    pub(crate) fn from_artifact(inner: CompressedArtifact) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_squeeze_core::{compress_image, CompressionSettings, DecodedImage};

    #[test]
    fn test_js_artifact_exposes_core_fields() {
        let image = DecodedImage::new(12, 6, vec![64u8; 12 * 6 * 3]);
        let artifact = compress_image(&image, &CompressionSettings::default()).unwrap();
        let size = artifact.size();

        let js = JsCompressedArtifact::from_artifact(artifact);
        assert_eq!(js.width(), 12);
        assert_eq!(js.height(), 6);
        assert_eq!(js.size(), size);
        assert_eq!(js.bytes().len(), size);
        assert_eq!(js.quality(), 85);
        assert_eq!(js.scale_factor(), 1.0);
        assert!(js.met_ceiling());
        assert_eq!(js.attempt_count(), 1);
    }
}
