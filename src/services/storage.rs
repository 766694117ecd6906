//! Document storage service.
//!
//! Stores uploaded files on the local filesystem under the configured
//! uploads directory and addresses them by public URL.

use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::config::UploadsConfig;
use crate::error::{AppError, AppResult};
use crate::models::book::DocumentDescriptor;

/// Maximum accepted document size in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 10_000_000;

/// An uploaded file as received from the request, before storage.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct StorageService {
    dir: PathBuf,
    public_base: String,
}

impl StorageService {
    pub fn new(config: &UploadsConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            public_base: config.public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Store an uploaded document and return its descriptor.
    pub async fn store(&self, upload: &FileUpload) -> AppResult<DocumentDescriptor> {
        if upload.bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(AppError::Upload(format!(
                "Document exceeds the maximum size of {} bytes",
                MAX_DOCUMENT_BYTES
            )));
        }

        fs::create_dir_all(&self.dir).await.map_err(|e| {
            tracing::error!("Failed to create upload directory {}: {}", self.dir.display(), e);
            AppError::Upload("Unable to upload book document!".to_string())
        })?;

        let stored_name = stored_file_name(&upload.file_name);
        let path = self.dir.join(&stored_name);

        fs::write(&path, &upload.bytes).await.map_err(|e| {
            tracing::error!("Failed to write document {}: {}", path.display(), e);
            AppError::Upload("Unable to upload book document!".to_string())
        })?;

        tracing::debug!("Stored document {} ({} bytes)", path.display(), upload.bytes.len());

        Ok(DocumentDescriptor {
            name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
            size: upload.bytes.len() as i64,
            url: format!("{}/uploads/{}", self.public_base, stored_name),
        })
    }

    /// Map a document URL back to its path inside the storage directory.
    ///
    /// Returns `None` for URLs not under this server's upload base.
    pub fn resolve_url(&self, url: &str) -> Option<PathBuf> {
        let prefix = format!("{}/uploads/", self.public_base);
        let file = url.strip_prefix(&prefix)?;

        if file.is_empty() || file.contains('/') || file.contains("..") {
            return None;
        }

        Some(self.dir.join(file))
    }

    /// Delete a stored file if present, returning whether one was removed.
    /// A missing file is not an error.
    pub async fn delete_if_exists(&self, path: &Path) -> AppResult<bool> {
        if fs::metadata(path).await.is_err() {
            return Ok(false);
        }

        fs::remove_file(path).await.map_err(|e| {
            tracing::error!("Failed to delete document {}: {}", path.display(), e);
            AppError::FileDelete(format!("Unable to delete previous document: {}", e))
        })?;

        Ok(true)
    }
}

/// Unique on-disk name preserving the original extension.
fn stored_file_name(original: &str) -> String {
    match Path::new(original).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}
