use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

/// Extensions accepted for avatars and chat uploads.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "pdf", "txt"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Filename has no extension")]
    MissingExtension,

    #[error("File type .{0} is not allowed")]
    DisallowedType(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// On-disk storage for uploaded files.
///
/// Uploads are stored flat under one directory, which is also served back as
/// static content. Stored names never reuse the client's filename: they are
/// derived from the uploader plus a random suffix.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn new(dir: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("upload storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Derive the stored name for an upload:
    /// `{uploader}_{8 random hex chars}.{lowercased original extension}`.
    /// Rejects filenames without an extension and extensions outside the
    /// allow-list.
    pub fn stored_name(username: &str, original: &str) -> Result<String, UploadError> {
        let ext = original
            .rsplit_once('.')
            .map(|(_, e)| e.to_ascii_lowercase())
            .ok_or(UploadError::MissingExtension)?;
        if ext.is_empty() {
            return Err(UploadError::MissingExtension);
        }
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(UploadError::DisallowedType(ext));
        }

        let suffix = Uuid::new_v4().simple().to_string();
        Ok(format!("{}_{}.{}", username, &suffix[..8], ext))
    }

    /// Validate, name and write one upload. Returns the stored name. Nothing
    /// is written if validation fails.
    pub async fn store(
        &self,
        username: &str,
        original: &str,
        data: &[u8],
    ) -> Result<String, UploadError> {
        let name = Self::stored_name(username, original)?;
        fs::write(self.dir.join(&name), data).await?;
        info!("stored upload {} ({} bytes)", name, data.len());
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_name_keeps_uploader_and_extension() {
        let name = FileStore::stored_name("daniello", "Holiday Photo.JPG").unwrap();
        assert!(name.starts_with("daniello_"));
        assert!(name.ends_with(".jpg"));
        // username + '_' + 8 hex chars + ".jpg"
        let middle = &name["daniello_".len()..name.len() - ".jpg".len()];
        assert_eq!(middle.len(), 8);
        assert!(middle.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn stored_names_are_unique_per_call() {
        let a = FileStore::stored_name("roham", "a.png").unwrap();
        let b = FileStore::stored_name("roham", "a.png").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn extensionless_filename_is_rejected() {
        assert!(matches!(
            FileStore::stored_name("roham", "README"),
            Err(UploadError::MissingExtension)
        ));
        assert!(matches!(
            FileStore::stored_name("roham", "trailing."),
            Err(UploadError::MissingExtension)
        ));
    }

    #[test]
    fn disallowed_extension_is_rejected() {
        assert!(matches!(
            FileStore::stored_name("roham", "payload.exe"),
            Err(UploadError::DisallowedType(e)) if e == "exe"
        ));
    }

    #[tokio::test]
    async fn store_writes_under_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("uploads")).await.unwrap();

        let name = store.store("nazari", "pic.png", b"png-bytes").await.unwrap();
        let on_disk = tokio::fs::read(store.dir().join(&name)).await.unwrap();
        assert_eq!(on_disk, b"png-bytes");
    }

    #[tokio::test]
    async fn failed_validation_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("uploads")).await.unwrap();

        assert!(store.store("nazari", "script.sh", b"#!/bin/sh").await.is_err());

        let mut entries = tokio::fs::read_dir(store.dir()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }
}
