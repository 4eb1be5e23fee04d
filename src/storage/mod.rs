// src/storage/mod.rs - Durable blob storage for saved transcripts

pub mod credentials;
pub mod gcs;
pub mod local;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::infra::config::{StorageBackend, StorageConfig};
use crate::infra::errors::CoachError;

/// Destination for transcript files. Writing an existing name overwrites it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Human-readable location, shown after a manual save.
    fn name(&self) -> &str;

    async fn upload_file(&self, blob_name: &str, local_path: &Path) -> Result<(), CoachError>;
}

/// Build the configured store. A GCS store must reach its bucket here;
/// failing that is a configuration error and the caller should stop.
pub async fn open(config: &StorageConfig) -> Result<Arc<dyn BlobStore>, CoachError> {
    match config.backend {
        StorageBackend::Gcs => {
            let creds = credentials::GcsCredentials::load()?;
            let store = gcs::GcsBlobStore::connect(&config.bucket, &config.project, creds).await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Local => Ok(Arc::new(local::LocalBlobStore::new(config.local_dir()))),
    }
}
