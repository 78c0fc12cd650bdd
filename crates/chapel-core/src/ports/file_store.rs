//! File storage port used by image uploads.

use async_trait::async_trait;

/// Object/file storage reachable by URL.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `bytes` under `name` and return the public URL.
    async fn put(&self, name: &str, content_type: &str, bytes: &[u8])
    -> Result<String, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid object name: {0}")]
    InvalidName(String),

    #[error("Write failed: {0}")]
    Io(String),
}
