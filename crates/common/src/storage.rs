//! Local filesystem storage for uploaded post images.

use std::path::PathBuf;

use crate::{AppError, AppResult};

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (path relative to the media root).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload a file.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<UploadedFile>;

    /// Delete a file.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<UploadedFile> {
        let path = self.base_path.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file: {e}")))?;

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.base_path.join(key);
        Ok(path.exists())
    }
}

/// Build a storage key for an uploaded post image.
///
/// The original filename is kept as a suffix so stored files stay
/// recognizable; the ULID prefix guarantees uniqueness.
#[must_use]
pub fn generate_storage_key(id: &str, filename: &str) -> String {
    // Strip any path components a client might smuggle in
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    format!("posts/{id}-{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_strips_directories() {
        let key = generate_storage_key("01abc", "../../etc/passwd");
        assert_eq!(key, "posts/01abc-passwd");
    }

    #[test]
    fn storage_key_plain_filename() {
        let key = generate_storage_key("01abc", "small.gif");
        assert_eq!(key, "posts/01abc-small.gif");
    }

    #[tokio::test]
    async fn local_storage_roundtrip() {
        let dir = std::env::temp_dir().join(format!("quill-storage-{}", std::process::id()));
        let storage = LocalStorage::new(dir.clone(), "/media".to_string());

        let file = storage
            .upload("posts/x-small.gif", b"GIF89a", "image/gif")
            .await
            .unwrap();
        assert_eq!(file.url, "/media/posts/x-small.gif");
        assert_eq!(file.size, 6);
        assert!(storage.exists("posts/x-small.gif").await.unwrap());

        storage.delete("posts/x-small.gif").await.unwrap();
        assert!(!storage.exists("posts/x-small.gif").await.unwrap());

        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
