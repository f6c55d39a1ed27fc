use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Blob-storage boundary, consumed here. Items only carry the returned URL
/// as an opaque string; nothing in the crate interprets it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` and return an opaque URL for later retrieval.
    async fn upload(&self, bytes: &[u8], content_type: &str) -> AppResult<String>;
    async fn delete(&self, url: &str) -> AppResult<()>;
}

/// Filesystem-backed implementation for local use: blobs land under the app
/// data dir and the "URL" is a `file://` path.
pub struct FsBlobStore {
    base: PathBuf,
}

impl FsBlobStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn extension_for(content_type: &str) -> &'static str {
        match content_type {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "bin",
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, bytes: &[u8], content_type: &str) -> AppResult<String> {
        std::fs::create_dir_all(&self.base).map_err(|err| {
            AppError::from(err)
                .with_context("operation", "create_blob_dir")
                .with_context("path", self.base.display().to_string())
        })?;
        let name = format!(
            "{}.{}",
            Uuid::new_v4(),
            Self::extension_for(content_type)
        );
        let path = self.base.join(&name);
        std::fs::write(&path, bytes).map_err(|err| {
            AppError::from(err)
                .with_context("operation", "write_blob")
                .with_context("path", path.display().to_string())
        })?;
        Ok(format!("file://{}", path.display()))
    }

    async fn delete(&self, url: &str) -> AppResult<()> {
        let Some(path) = url.strip_prefix("file://") else {
            return Err(AppError::new("BLOB/FOREIGN_URL", "Not a local blob URL")
                .with_context("url", url.to_string()));
        };
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::from(err).with_context("operation", "delete_blob")),
        }
    }
}
