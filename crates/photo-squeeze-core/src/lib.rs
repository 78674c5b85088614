//! photo-squeeze core - size-bounded photo compression
//!
//! This crate compresses uploaded photos below a fixed byte ceiling and
//! provides the small pieces around it: storage filenames, the reversible
//! identifier transform, a file store abstraction, an identity directory,
//! and the upload workflow tying them together.
//!
//! # Module Structure
//!
//! - `decode` - Decode JPEG/PNG uploads to RGB and resample them
//! - `encode` - JPEG encoding of a raster at a given quality
//! - `compress` - The quality/downscale search that meets the ceiling
//! - `naming` - Sanitized `.jpg` filenames from person names
//! - `identifier` - Reversible edge-swap transform for identifiers
//! - `store` - File repository trait with memory and folder backends
//! - `directory` - Identity records keyed on transformed identifiers
//! - `uploader` - Name, compress, and store a photo in one call

pub mod compress;
pub mod decode;
pub mod directory;
pub mod encode;
pub mod identifier;
pub mod naming;
pub mod store;
pub mod uploader;

pub use compress::{
    compress, compress_image, compress_with_ceiling, CompressError, CompressedArtifact,
    CompressionAttempt, CompressionSettings,
};
pub use decode::{decode_image, DecodeError, DecodedImage};
pub use directory::{DirectoryError, IdentityDirectory, IdentityRecord};
pub use encode::EncodeError;
pub use naming::{photo_filename, sanitize_filename, NamingError};
pub use store::{FileId, FileStore, FolderStore, MemoryStore, StoreError, StoredFile};
pub use uploader::{PhotoUploader, UploadError, UploadOutcome};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports_compose() {
        let image = DecodedImage::new(8, 8, vec![200u8; 8 * 8 * 3]);
        let artifact = compress_image(&image, &CompressionSettings::default()).unwrap();
        assert!(artifact.met_ceiling);

        let decoded = decode_image(&artifact.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (8, 8));
    }

    #[test]
    fn test_default_settings_match_reference_values() {
        let settings = CompressionSettings::default();
        assert_eq!(settings.ceiling_bytes, 50_000);
        assert_eq!(settings.start_quality, 85);
        assert_eq!(settings.quality_step, 5);
        assert_eq!(settings.min_quality, 10);
        assert_eq!(settings.reset_quality, 30);
        assert_eq!(settings.shrink_factor, 0.8);
    }
}
