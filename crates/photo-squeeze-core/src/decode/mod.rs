//! Image decoding for uploaded photos.
//!
//! This module provides functionality for:
//! - Decoding JPEG and PNG uploads into a normalized RGB raster
//! - Applying EXIF orientation so portrait phone photos come out upright
//! - Resampling a raster for the compression search
//!
//! All operations are synchronous and allocate fresh buffers; inputs are
//! never modified.

mod resize;
mod source;
mod types;

pub use resize::{resize, scale_dimensions};
pub use source::decode_image;
pub use types::{DecodeError, DecodedImage};
