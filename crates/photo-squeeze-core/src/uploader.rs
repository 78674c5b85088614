//! Upload and retrieval workflow: name a photo, compress it, store it.

use thiserror::Error;
use tracing::{info, instrument};

use crate::compress::{compress, CompressError, CompressedArtifact, CompressionSettings};
use crate::naming::{photo_filename, NamingError};
use crate::store::{FileId, FileStore, StoreError, StoredFile};

/// Errors from the upload workflow.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error(transparent)]
    Compress(#[from] CompressError),

    /// The photo could not be brought under the ceiling, so nothing was stored.
    #[error("Could not compress below {ceiling} bytes (smallest attempt was {size} bytes)")]
    CeilingNotMet {
        size: usize,
        ceiling: usize,
        artifact: Box<CompressedArtifact>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Filename the photo was stored under.
    pub filename: String,
    /// Id assigned by the store.
    pub file_id: FileId,
    /// The uploaded bytes and how they were produced, for offering the same
    /// file back to the user.
    pub artifact: CompressedArtifact,
}

/// Couples a [`FileStore`] with the folder and compression settings used for
/// every photo.
#[derive(Debug)]
pub struct PhotoUploader<S> {
    store: S,
    folder: String,
    settings: CompressionSettings,
}

impl<S: FileStore> PhotoUploader<S> {
    pub fn new(store: S, folder: impl Into<String>, settings: CompressionSettings) -> Self {
        Self {
            store,
            folder: folder.into(),
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn settings(&self) -> &CompressionSettings {
        &self.settings
    }

    /// Compress `photo` and store it as `<sanitized name>.jpg`.
    ///
    /// Nothing is stored unless the compressed photo fits the ceiling.
    #[instrument(skip(self, photo), fields(folder = %self.folder, input_size = photo.len()))]
    pub fn upload(&self, name: &str, photo: &[u8]) -> Result<UploadOutcome, UploadError> {
        let filename = photo_filename(name)?;
        let artifact = compress(photo, &self.settings)?;

        if !artifact.met_ceiling {
            return Err(UploadError::CeilingNotMet {
                size: artifact.size(),
                ceiling: self.settings.ceiling_bytes,
                artifact: Box::new(artifact),
            });
        }

        let file_id = self.store.upload(&artifact.bytes, &filename, &self.folder)?;
        info!(%file_id, %filename, size = artifact.size(), "uploaded photo");

        Ok(UploadOutcome {
            filename,
            file_id,
            artifact,
        })
    }

    /// Files in the folder whose name contains `term`.
    pub fn search(&self, term: &str) -> Result<Vec<StoredFile>, StoreError> {
        self.store.search(term, &self.folder)
    }

    /// Id of the file stored under exactly `filename`.
    pub fn find(&self, filename: &str) -> Result<Option<FileId>, StoreError> {
        self.store.find(filename, &self.folder)
    }

    /// Content of a stored file.
    pub fn download(&self, id: &FileId) -> Result<Vec<u8>, StoreError> {
        self.store.download(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn uploader(settings: CompressionSettings) -> PhotoUploader<MemoryStore> {
        PhotoUploader::new(MemoryStore::new(), "photos", settings)
    }

    #[test]
    fn test_upload_stores_compressed_bytes() {
        let uploader = uploader(CompressionSettings::default());
        let outcome = uploader.upload("John Doe", &png(64, 48)).unwrap();

        assert_eq!(outcome.filename, "John_Doe.jpg");
        assert!(outcome.artifact.met_ceiling);
        let stored = uploader.download(&outcome.file_id).unwrap();
        assert_eq!(stored, outcome.artifact.bytes);
        assert_eq!(
            uploader.find("John_Doe.jpg").unwrap(),
            Some(outcome.file_id.clone())
        );
    }

    #[test]
    fn test_upload_then_search() {
        let uploader = uploader(CompressionSettings::default());
        uploader.upload("John Doe", &png(16, 16)).unwrap();
        uploader.upload("Jane Doe", &png(16, 16)).unwrap();
        uploader.upload("Ram Thapa", &png(16, 16)).unwrap();

        let hits = uploader.search("Doe").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "Jane_Doe.jpg");
    }

    #[test]
    fn test_upload_rejects_when_ceiling_not_met() {
        let uploader = uploader(CompressionSettings::with_ceiling(10));
        let result = uploader.upload("Tiny", &png(1, 1));

        match result {
            Err(UploadError::CeilingNotMet {
                size,
                ceiling,
                artifact,
            }) => {
                assert_eq!(ceiling, 10);
                assert!(size > 10);
                assert_eq!(artifact.size(), size);
            }
            other => panic!("expected CeilingNotMet, got {other:?}"),
        }
        assert!(uploader.store().is_empty());
    }

    #[test]
    fn test_upload_rejects_unusable_name() {
        let uploader = uploader(CompressionSettings::default());
        assert!(matches!(
            uploader.upload("???", &png(4, 4)),
            Err(UploadError::Naming(_))
        ));
    }

    #[test]
    fn test_upload_rejects_non_image() {
        let uploader = uploader(CompressionSettings::default());
        assert!(matches!(
            uploader.upload("John", b"not a photo"),
            Err(UploadError::Compress(CompressError::Decode(_)))
        ));
        assert!(uploader.store().is_empty());
    }
}
