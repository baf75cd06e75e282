#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
#[cfg(not(all(feature = "storage-s3", feature = "storage-local")))]
use crate::StorageError;
use crate::{Storage, StorageResult};
use eventflyer_core::StorageSelection;
use std::sync::Arc;

/// Create the storage backend chosen at startup
pub async fn create_storage(selection: &StorageSelection) -> StorageResult<Arc<dyn Storage>> {
    match selection {
        #[cfg(feature = "storage-s3")]
        StorageSelection::S3(settings) => {
            let storage = S3Storage::new(settings)?;
            tracing::info!(
                bucket = %settings.bucket,
                region = %settings.region,
                endpoint = ?settings.endpoint,
                "Using S3 storage backend"
            );
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageSelection::S3(_) => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageSelection::Local(settings) => {
            let storage = LocalStorage::new(&settings.path, settings.base_url.clone()).await?;
            tracing::info!(
                path = %settings.path,
                base_url = %settings.base_url,
                "Using local storage backend"
            );
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageSelection::Local(_) => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
