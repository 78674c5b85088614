//! CLI error type and exit codes.

use config::ConfigError;
use photo_squeeze_core::{CompressError, DirectoryError, StoreError, UploadError};
use thiserror::Error;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CliExitCode {
    Success = 0,
    Error = 1,
    /// The photo could not be compressed below the ceiling.
    CeilingNotMet = 2,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Compress(#[from] CompressError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("Could not compress below {ceiling} bytes (smallest attempt was {size} bytes)")]
    CeilingNotMet { size: usize, ceiling: usize },

    #[error("No identity directory configured (set [directory] path)")]
    NoDirectory,

    #[error("No identity record for {0}")]
    UnknownIdentifier(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Map an error to the exit code the process should return.
pub fn exit_code_for_error(err: &CliError) -> CliExitCode {
    match err {
        CliError::CeilingNotMet { .. } | CliError::Upload(UploadError::CeilingNotMet { .. }) => {
            CliExitCode::CeilingNotMet
        }
        _ => CliExitCode::Error,
    }
}
