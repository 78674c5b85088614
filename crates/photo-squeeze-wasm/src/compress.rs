//! Compression WASM bindings.
//!
//! Lets a browser front end squeeze a photo below the upload ceiling before
//! it ever leaves the page.
//!
//! # Example
//!
//! ```typescript
//! import { compress_photo } from '@photo-squeeze/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_photo(bytes, 50000);
//! if (!result.met_ceiling) {
//!   throw new Error(`Could not compress below 50 KB (${result.size} bytes)`);
//! }
//! const jpeg = result.bytes();
//! ```

use crate::types::JsCompressedArtifact;
use photo_squeeze_core::compress::{self, CompressionSettings};
use wasm_bindgen::prelude::*;

/// Compress an uploaded photo (JPEG or PNG) below `ceiling_bytes` using the
/// default search parameters.
///
/// # Errors
///
/// Returns an error if the bytes are not an image, the ceiling is zero, or
/// encoding fails. Missing the ceiling is not an error; check `met_ceiling`.
#[wasm_bindgen]
pub fn compress_photo(bytes: &[u8], ceiling_bytes: usize) -> Result<JsCompressedArtifact, JsValue> {
    compress::compress_with_ceiling(bytes, ceiling_bytes)
        .map(JsCompressedArtifact::from_artifact)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Compress with explicit search parameters.
///
/// `settings` is a plain object with any of `ceiling_bytes`, `start_quality`,
/// `quality_step`, `min_quality`, `reset_quality`, `shrink_factor`,
/// `min_dimension`, `max_downscale_rounds`; missing keys use the defaults.
#[wasm_bindgen]
pub fn compress_photo_with_settings(
    bytes: &[u8],
    settings: JsValue,
) -> Result<JsCompressedArtifact, JsValue> {
    let settings: CompressionSettings = serde_wasm_bindgen::from_value(settings)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    compress::compress(bytes, &settings)
        .map(JsCompressedArtifact::from_artifact)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Default compression settings as a plain object.
#[wasm_bindgen]
pub fn default_compression_settings() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&CompressionSettings::default())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
