//! Application configuration, loaded once at startup.
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use photo_squeeze_core::CompressionSettings;
use serde::Deserialize;

/// Directory the folder store writes under when nothing is configured.
pub const DEFAULT_STORAGE_ROOT: &str = "photo-store";
/// Folder photos are uploaded into when nothing is configured.
pub const DEFAULT_FOLDER: &str = "photos";

/// Top-level configuration.
#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    /// Where uploaded photos live.
    pub storage: StorageConfig,
    /// Compression search parameters.
    #[serde(default)]
    pub compression: CompressionSettings,
    /// Optional identity directory used by `lookup`.
    #[serde(default)]
    pub directory: Option<DirectoryConfig>,
}

/// Folder store configuration.
#[derive(Deserialize, Clone, Debug)]
pub struct StorageConfig {
    /// Root directory of the folder store.
    pub root: PathBuf,
    /// Folder (subdirectory) photos are uploaded into and searched in.
    pub folder: String,
}

/// Identity directory configuration.
#[derive(Deserialize, Clone, Debug)]
pub struct DirectoryConfig {
    /// JSON file with an array of identity records.
    pub path: PathBuf,
}

impl Settings {
    /// Build settings from defaults, an optional TOML file, and environment
    /// variables, in increasing order of precedence.
    ///
    /// Environment variables are prefixed with `PHOTO_SQUEEZE_` and nested
    /// keys are separated by a double underscore, e.g.
    /// `PHOTO_SQUEEZE_COMPRESSION__CEILING_BYTES=40000`.
    pub fn new(config_path: Option<impl AsRef<Path>>) -> Result<Self, ConfigError> {
        let env = Environment::with_prefix("PHOTO_SQUEEZE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);

        let mut cfg_builder = Config::builder()
            .set_default("storage.root", DEFAULT_STORAGE_ROOT)?
            .set_default("storage.folder", DEFAULT_FOLDER)?;

        if let Some(path) = config_path {
            cfg_builder = cfg_builder.add_source(File::from(path.as_ref()));
        }
        cfg_builder = cfg_builder.add_source(env);

        let settings: Settings = cfg_builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let folder = &self.storage.folder;
        if folder.is_empty() || folder.contains(['/', '\\']) || folder.starts_with('.') {
            return Err(ConfigError::Message(format!(
                "[storage.folder] must be a single directory name, got {folder:?}"
            )));
        }

        self.compression
            .validate()
            .map_err(|e| ConfigError::Message(format!("[compression] {e}")))
    }
}
