//! JPEG encoding for compression attempts.
//!
//! Every attempt in the compression search goes through [`encode_jpeg`] and
//! produces an in-memory buffer; nothing is written to disk.

mod jpeg;

pub use jpeg::{encode_image, encode_jpeg, EncodeError};
