//! File repository that compressed photos are uploaded to and retrieved from.
//!
//! [`FileStore`] is the seam to whatever backend holds the photos. Two
//! backends ship with the crate:
//!
//! - [`MemoryStore`] keeps everything in a map, for tests and embedding.
//! - [`FolderStore`] maps each folder to a directory under a root path.
//!
//! Uploading a name that already exists in a folder replaces its content.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised by file store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No file with the given id exists.
    #[error("File not found: {0}")]
    NotFound(String),

    /// A name, folder, or search term contains characters the store refuses.
    #[error("Invalid name or search term: {0:?}")]
    InvalidName(String),

    /// The backend's shared state was poisoned by a panicking writer.
    #[error("Store state is poisoned")]
    Poisoned,

    /// I/O error from a filesystem backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Opaque identifier of a stored file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: FileId,
    pub name: String,
}

/// Backend that stores named files inside folders.
pub trait FileStore {
    /// Store `bytes` as `name` inside `folder` and return its id.
    fn upload(&self, bytes: &[u8], name: &str, folder: &str) -> Result<FileId, StoreError>;

    /// Find the id of the file named exactly `name` inside `folder`.
    fn find(&self, name: &str, folder: &str) -> Result<Option<FileId>, StoreError>;

    /// List files in `folder` whose name contains `term`, sorted by name.
    /// An empty term lists the whole folder.
    fn search(&self, term: &str, folder: &str) -> Result<Vec<StoredFile>, StoreError>;

    /// Fetch the content of a stored file.
    fn download(&self, id: &FileId) -> Result<Vec<u8>, StoreError>;
}

/// Reject names that could escape a folder or break a backend query.
fn check_component(value: &str) -> Result<(), StoreError> {
    let bad = value.is_empty()
        || value.starts_with('.')
        || value.chars().any(|c| matches!(c, '/' | '\\' | '\'' | '"' | '\0'));
    if bad {
        return Err(StoreError::InvalidName(value.to_string()));
    }
    Ok(())
}

fn check_term(term: &str) -> Result<(), StoreError> {
    if term.is_empty() {
        return Ok(());
    }
    check_component(term)
}

#[derive(Debug)]
struct MemoryEntry {
    folder: String,
    name: String,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    next_id: u64,
    files: BTreeMap<FileId, MemoryEntry>,
}

/// In-memory [`FileStore`]. Ids look like `mem-1`, `mem-2`, ...
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files across all folders, counted even when the lock
    /// is poisoned.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .files
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FileStore for MemoryStore {
    fn upload(&self, bytes: &[u8], name: &str, folder: &str) -> Result<FileId, StoreError> {
        check_component(name)?;
        check_component(folder)?;
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;

        let existing = inner
            .files
            .iter()
            .find(|(_, entry)| entry.folder == folder && entry.name == name)
            .map(|(id, _)| id.clone());

        let id = match existing {
            Some(id) => id,
            None => {
                inner.next_id += 1;
                FileId(format!("mem-{}", inner.next_id))
            }
        };

        debug!(%id, name, folder, size = bytes.len(), "storing file in memory");
        inner.files.insert(
            id.clone(),
            MemoryEntry {
                folder: folder.to_string(),
                name: name.to_string(),
                bytes: bytes.to_vec(),
            },
        );
        Ok(id)
    }

    fn find(&self, name: &str, folder: &str) -> Result<Option<FileId>, StoreError> {
        check_component(name)?;
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner
            .files
            .iter()
            .find(|(_, entry)| entry.folder == folder && entry.name == name)
            .map(|(id, _)| id.clone()))
    }

    fn search(&self, term: &str, folder: &str) -> Result<Vec<StoredFile>, StoreError> {
        check_term(term)?;
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut hits: Vec<StoredFile> = inner
            .files
            .iter()
            .filter(|(_, entry)| entry.folder == folder && entry.name.contains(term))
            .map(|(id, entry)| StoredFile {
                id: id.clone(),
                name: entry.name.clone(),
            })
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hits)
    }

    fn download(&self, id: &FileId) -> Result<Vec<u8>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        inner
            .files
            .get(id)
            .map(|entry| entry.bytes.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

/// Filesystem [`FileStore`]: each folder is a directory under `root`, and a
/// file id is `<folder>/<name>`.
///
/// Uploads are written to a uniquely named scratch file in the target
/// directory and renamed into place, so concurrent uploads never share a
/// temporary path.
#[derive(Debug, Clone)]
pub struct FolderStore {
    root: PathBuf,
}

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

impl FolderStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn folder_path(&self, folder: &str) -> Result<PathBuf, StoreError> {
        check_component(folder)?;
        Ok(self.root.join(folder))
    }

    fn scratch_path(dir: &Path, name: &str) -> PathBuf {
        let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        dir.join(format!(".{name}.{}.{n}.tmp", std::process::id()))
    }

    fn id_to_path(&self, id: &FileId) -> Result<PathBuf, StoreError> {
        let (folder, name) = id
            .as_str()
            .split_once('/')
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        check_component(name)?;
        Ok(self.folder_path(folder)?.join(name))
    }
}

impl FileStore for FolderStore {
    fn upload(&self, bytes: &[u8], name: &str, folder: &str) -> Result<FileId, StoreError> {
        check_component(name)?;
        let dir = self.folder_path(folder)?;
        fs::create_dir_all(&dir)?;

        let scratch = Self::scratch_path(&dir, name);
        let target = dir.join(name);
        debug!(path = %target.display(), size = bytes.len(), "writing file");

        if let Err(e) = fs::write(&scratch, bytes).and_then(|()| fs::rename(&scratch, &target)) {
            let _ = fs::remove_file(&scratch);
            return Err(e.into());
        }
        Ok(FileId(format!("{folder}/{name}")))
    }

    fn find(&self, name: &str, folder: &str) -> Result<Option<FileId>, StoreError> {
        check_component(name)?;
        let path = self.folder_path(folder)?.join(name);
        Ok(path.is_file().then(|| FileId(format!("{folder}/{name}"))))
    }

    fn search(&self, term: &str, folder: &str) -> Result<Vec<StoredFile>, StoreError> {
        check_term(term)?;
        let dir = self.folder_path(folder)?;

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut hits = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') || !name.contains(term) {
                continue;
            }
            hits.push(StoredFile {
                id: FileId(format!("{folder}/{name}")),
                name,
            });
        }
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hits)
    }

    fn download(&self, id: &FileId) -> Result<Vec<u8>, StoreError> {
        let path = self.id_to_path(id)?;
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(id.to_string()),
            _ => StoreError::Io(e),
        })
    }
}
