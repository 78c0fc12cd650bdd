//! Local-disk file store. Files are served by whatever sits in front of `public_base_url`.

use std::path::PathBuf;

use async_trait::async_trait;

use chapel_core::ports::{FileStore, StorageError};

pub struct LocalFileStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url: String = public_base_url.into();
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Flat names only: no separators, no leading dot.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(
        &self,
        name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        if !is_safe_name(name) {
            return Err(StorageError::InvalidName(name.to_string()));
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tokio::fs::write(self.root.join(name), bytes)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::debug!(file = %name, content_type, size = bytes.len(), "Stored upload");
        Ok(format!("{}/{}", self.public_base_url, name))
    }
}
