//! Subcommand handlers.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use photo_squeeze_core::{
    compress, identifier, CompressedArtifact, FileId, FolderStore, IdentityDirectory,
    PhotoUploader,
};
use serde_json::json;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::CliError;

#[derive(Subcommand, Debug)]
pub enum IdCommands {
    /// Transform a plain identifier into its stored form
    Encode { value: String },
    /// Recover a plain identifier from its stored form
    Decode { value: String },
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|e| CliError::io(format!("reading {}", path.display()), e))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    fs::write(path, bytes).map_err(|e| CliError::io(format!("writing {}", path.display()), e))
}

fn artifact_summary(artifact: &CompressedArtifact) -> serde_json::Value {
    json!({
        "size": artifact.size(),
        "ceiling_bytes": artifact.ceiling_bytes,
        "met_ceiling": artifact.met_ceiling,
        "width": artifact.width,
        "height": artifact.height,
        "quality": artifact.quality,
        "scale_factor": artifact.scale_factor,
        "attempts": artifact.attempts.len(),
    })
}

fn uploader(settings: &Settings) -> PhotoUploader<FolderStore> {
    PhotoUploader::new(
        FolderStore::new(&settings.storage.root),
        settings.storage.folder.clone(),
        settings.compression,
    )
}

/// Compress a local file without storing it.
pub fn handle_compress(
    settings: &Settings,
    input: &Path,
    output: &Path,
    ceiling: Option<usize>,
    keep_oversize: bool,
) -> Result<(), CliError> {
    let mut compression = settings.compression;
    if let Some(ceiling) = ceiling {
        compression.ceiling_bytes = ceiling;
    }

    let artifact = compress::compress(&read_file(input)?, &compression)?;
    println!("{}", serde_json::to_string_pretty(&artifact_summary(&artifact))?);

    if !artifact.met_ceiling && !keep_oversize {
        return Err(CliError::CeilingNotMet {
            size: artifact.size(),
            ceiling: compression.ceiling_bytes,
        });
    }

    write_file(output, &artifact.bytes)?;
    info!(path = %output.display(), size = artifact.size(), "wrote compressed photo");
    Ok(())
}

/// Compress a photo and store it under the person's name.
pub fn handle_upload(
    settings: &Settings,
    name: &str,
    photo: &Path,
    save: Option<&Path>,
) -> Result<(), CliError> {
    let outcome = uploader(settings).upload(name, &read_file(photo)?)?;

    let mut summary = artifact_summary(&outcome.artifact);
    summary["filename"] = json!(outcome.filename);
    summary["file_id"] = json!(outcome.file_id);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(path) = save {
        write_file(path, &outcome.artifact.bytes)?;
    }
    Ok(())
}

/// List stored photos whose filename contains `term`.
pub fn handle_search(settings: &Settings, term: &str) -> Result<(), CliError> {
    let hits = uploader(settings).search(term)?;
    if hits.is_empty() {
        warn!(term, "no files found matching search");
        eprintln!("No files found matching {term:?}");
        return Ok(());
    }

    for hit in hits {
        println!("{}\t{}", hit.name, hit.id);
    }
    Ok(())
}

/// Fetch a stored photo to a local path.
///
/// Without `output`, the file is written to the current directory under its
/// stored name.
pub fn handle_download(
    settings: &Settings,
    file_id: &str,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let id = FileId::new(file_id);
    let bytes = uploader(settings).download(&id)?;

    let target = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_id.rsplit('/').next().unwrap_or(file_id)),
    };
    write_file(&target, &bytes)?;
    println!("{}", target.display());
    Ok(())
}

/// Look a person up in the identity directory by plain identifier.
pub fn handle_lookup(settings: &Settings, plain_identifier: &str) -> Result<(), CliError> {
    let config = settings.directory.as_ref().ok_or(CliError::NoDirectory)?;
    let file = fs::File::open(&config.path)
        .map_err(|e| CliError::io(format!("opening {}", config.path.display()), e))?;
    let directory = IdentityDirectory::from_json(std::io::BufReader::new(file))?;

    let record = directory
        .lookup(plain_identifier)
        .ok_or_else(|| CliError::UnknownIdentifier(plain_identifier.to_string()))?;
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

pub fn handle_id(action: IdCommands) -> String {
    match action {
        IdCommands::Encode { value } => identifier::encrypt(&value),
        IdCommands::Decode { value } => identifier::decrypt(&value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DirectoryConfig, StorageConfig};
    use photo_squeeze_core::encode::encode_jpeg;
    use photo_squeeze_core::CompressionSettings;

    fn settings(root: &Path) -> Settings {
        Settings {
            storage: StorageConfig {
                root: root.to_path_buf(),
                folder: "photos".to_string(),
            },
            compression: CompressionSettings::default(),
            directory: None,
        }
    }

    fn write_photo(dir: &Path, width: u32, height: u32) -> PathBuf {
        let pixels = vec![150u8; (width * height * 3) as usize];
        let path = dir.join("input.jpg");
        fs::write(&path, encode_jpeg(&pixels, width, height, 95).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_compress_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_photo(dir.path(), 32, 32);
        let output = dir.path().join("out.jpg");

        handle_compress(&settings(dir.path()), &input, &output, None, false).unwrap();
        assert!(fs::read(&output).unwrap().len() <= 50_000);
    }

    #[test]
    fn test_compress_ceiling_not_met() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_photo(dir.path(), 1, 1);
        let output = dir.path().join("out.jpg");

        let err = handle_compress(&settings(dir.path()), &input, &output, Some(10), false)
            .unwrap_err();
        assert!(matches!(err, CliError::CeilingNotMet { ceiling: 10, .. }));
        assert!(!output.exists());

        handle_compress(&settings(dir.path()), &input, &output, Some(10), true).unwrap();
        assert!(output.exists());
    }

    #[test]
    fn test_upload_search_download() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let photo = write_photo(dir.path(), 40, 30);
        let saved = dir.path().join("saved.jpg");

        handle_upload(&settings, "Ram Thapa", &photo, Some(&saved)).unwrap();
        let stored = dir.path().join("photos").join("Ram_Thapa.jpg");
        assert_eq!(fs::read(&stored).unwrap(), fs::read(&saved).unwrap());

        handle_search(&settings, "Thapa").unwrap();

        let fetched = dir.path().join("fetched.jpg");
        handle_download(&settings, "photos/Ram_Thapa.jpg", Some(&fetched)).unwrap();
        assert_eq!(fs::read(&fetched).unwrap(), fs::read(&stored).unwrap());
    }

    #[test]
    fn test_download_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("x.jpg");
        assert!(matches!(
            handle_download(&settings(dir.path()), "photos/absent.jpg", Some(&out)),
            Err(CliError::Store(_))
        ));
    }

    #[test]
    fn test_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let records = dir.path().join("people.json");
        fs::write(&records, r#"[{ "identifier": "78345612", "name": "Ram Thapa" }]"#).unwrap();

        let mut settings = settings(dir.path());
        assert!(matches!(
            handle_lookup(&settings, "12345678"),
            Err(CliError::NoDirectory)
        ));

        settings.directory = Some(DirectoryConfig { path: records });
        handle_lookup(&settings, "12345678").unwrap();
        assert!(matches!(
            handle_lookup(&settings, "00000000"),
            Err(CliError::UnknownIdentifier(_))
        ));
    }

    #[test]
    fn test_id_commands() {
        assert_eq!(
            handle_id(IdCommands::Encode {
                value: "12345678".to_string()
            }),
            "78345612"
        );
        assert_eq!(
            handle_id(IdCommands::Decode {
                value: "78345612".to_string()
            }),
            "12345678"
        );
    }
}
