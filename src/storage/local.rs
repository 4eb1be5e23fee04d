// src/storage/local.rs - Directory-backed blob store for offline classrooms

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::BlobStore;
use crate::infra::errors::CoachError;

pub struct LocalBlobStore {
    root: PathBuf,
    label: String,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf) -> Self {
        let label = format!("local directory {}", root.display());
        Self { root, label }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn name(&self) -> &str {
        &self.label
    }

    async fn upload_file(&self, blob_name: &str, local_path: &Path) -> Result<(), CoachError> {
        if blob_name.contains('/') || blob_name.contains('\\') || blob_name.starts_with('.') {
            return Err(CoachError::storage("local", format!("invalid blob name '{blob_name}'")));
        }
        tokio::fs::create_dir_all(&self.root).await?;
        let target = self.root.join(blob_name);
        tokio::fs::copy(local_path, &target).await?;
        tracing::debug!(target = %target.display(), "Blob written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_creates_root_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path().join("bucket"));

        let src = dir.path().join("a.csv");
        std::fs::write(&src, "role,content\nuser,first\n").unwrap();
        store.upload_file("t.csv", &src).await.unwrap();

        std::fs::write(&src, "role,content\nuser,second\n").unwrap();
        store.upload_file("t.csv", &src).await.unwrap();

        let saved = std::fs::read_to_string(store.root().join("t.csv")).unwrap();
        assert!(saved.contains("second"));
        assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path().to_path_buf());
        let src = dir.path().join("a.csv");
        std::fs::write(&src, "x").unwrap();
        assert!(store.upload_file("../escape.csv", &src).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_source_is_error() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path().to_path_buf());
        let result = store
            .upload_file("t.csv", &dir.path().join("missing.csv"))
            .await;
        assert!(matches!(result, Err(CoachError::Io(_))));
    }
}
