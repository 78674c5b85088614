//! Identity directory: person records keyed on the transformed identifier.
//!
//! Records are stored under [`identifier::encrypt`] of their identifier, the
//! same form the upstream records keep it in. Lookups take the plain
//! identifier and transform it before matching exactly.

use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::identifier;

/// Errors from loading the identity directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The records could not be parsed.
    #[error("Invalid identity records: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two records share the same stored identifier.
    #[error("Duplicate identifier in identity records: {0}")]
    Duplicate(String),
}

/// A person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Identifier in stored (transformed) form.
    pub identifier: String,
    /// Person's name as recorded.
    pub name: String,
    /// Any further columns, passed through untouched.
    #[serde(default, flatten)]
    pub fields: BTreeMap<String, String>,
}

impl IdentityRecord {
    /// The identifier with the transform undone.
    pub fn plain_identifier(&self) -> String {
        identifier::decrypt(&self.identifier)
    }
}

/// In-memory identity directory.
#[derive(Debug, Clone, Default)]
pub struct IdentityDirectory {
    records: BTreeMap<String, IdentityRecord>,
}

impl IdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of records whose identifiers are already in stored
    /// form.
    pub fn from_json<R: Read>(reader: R) -> Result<Self, DirectoryError> {
        let records: Vec<IdentityRecord> = serde_json::from_reader(reader)?;
        let mut directory = Self::new();
        for record in records {
            if directory.records.contains_key(&record.identifier) {
                return Err(DirectoryError::Duplicate(record.identifier));
            }
            directory.records.insert(record.identifier.clone(), record);
        }
        debug!(records = directory.len(), "loaded identity directory");
        Ok(directory)
    }

    /// Add a person by plain identifier; the record is stored transformed.
    /// Returns the record previously stored under that identifier, if any.
    pub fn insert(
        &mut self,
        plain_identifier: &str,
        name: impl Into<String>,
        fields: BTreeMap<String, String>,
    ) -> Option<IdentityRecord> {
        let stored = identifier::encrypt(plain_identifier);
        let record = IdentityRecord {
            identifier: stored.clone(),
            name: name.into(),
            fields,
        };
        self.records.insert(stored, record)
    }

    /// Look up a person by plain identifier.
    pub fn lookup(&self, plain_identifier: &str) -> Option<&IdentityRecord> {
        self.records.get(&identifier::encrypt(plain_identifier))
    }

    /// All records, ordered by stored identifier.
    pub fn records(&self) -> impl Iterator<Item = &IdentityRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
