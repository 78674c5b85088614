//! photo-squeeze WASM - WebAssembly bindings for photo-squeeze
//!
//! This crate exposes the photo-squeeze-core compressor and naming helpers to
//! JavaScript so a browser can shrink a photo before uploading it.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper for compression results
//! - `compress` - Size-bounded compression bindings
//! - `naming` - Filename sanitizing and identifier transform bindings
//!
//! # Usage
//!
//! ```typescript
//! import init, { compress_photo, photo_filename } from '@photo-squeeze/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_photo(bytes, 50000);
//! const name = photo_filename(personName);
//! ```

use wasm_bindgen::prelude::*;

mod compress;
mod naming;
mod types;

pub use compress::{compress_photo, compress_photo_with_settings, default_compression_settings};
pub use naming::{decrypt_identifier, encrypt_identifier, photo_filename, sanitize_filename};
pub use types::JsCompressedArtifact;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
