//! Upload orchestrator: validate → sniff → resize per profile → store → URL map.
//!
//! Derivatives are produced and stored concurrently, one task per profile. The
//! caller sees either every profile stored or an error; derivatives stored
//! before a failure are deleted on a best-effort basis.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use eventflyer_core::constants::{CANONICAL_PROFILE, DEFAULT_STORAGE_TIMEOUT_SECS, SIZE_PROFILES};
use eventflyer_core::models::{SizeProfile, StoredAsset, UploadOutcome};
use eventflyer_storage::{derivative_key, Storage};
use futures::future::join_all;
use uuid::Uuid;

use super::types::{UploadError, UploadLimits, UploadRequest};
use crate::image::{ImageResizer, SourceImage};
use crate::sniff::sniff;
use crate::validator::UploadValidator;

/// A profile whose store step failed; `key` may hold a partial write
struct FailedDerivative {
    key: String,
    error: UploadError,
}

pub struct UploadOrchestrator {
    storage: Arc<dyn Storage>,
    profiles: Vec<SizeProfile>,
    limits: UploadLimits,
    validator: UploadValidator,
    storage_timeout: Duration,
}

impl UploadOrchestrator {
    pub fn new(storage: Arc<dyn Storage>, limits: UploadLimits) -> Self {
        Self {
            storage,
            profiles: SIZE_PROFILES.to_vec(),
            validator: UploadValidator::new(limits.max_file_size),
            limits,
            storage_timeout: Duration::from_secs(DEFAULT_STORAGE_TIMEOUT_SECS),
        }
    }

    /// Replace the size profiles. An empty list is ignored.
    pub fn with_profiles(mut self, profiles: Vec<SizeProfile>) -> Self {
        if !profiles.is_empty() {
            self.profiles = profiles;
        }
        self
    }

    /// Bound every storage `put` by `timeout`
    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    /// Validate, sniff, resize and store one upload.
    #[tracing::instrument(skip(self, request), fields(content_type = %request.content_type, size_bytes = request.len()))]
    pub async fn handle_upload(&self, request: UploadRequest) -> Result<UploadOutcome, UploadError> {
        let start = Instant::now();

        self.validator
            .validate_all(&request.content_type, request.len())?;

        let (format, dimensions) = sniff(&request.data).map_err(|e| {
            tracing::debug!(error = %e, "Image sniffing failed");
            UploadError::unreadable(Some(e))
        })?;

        if !dimensions.fits_within(self.limits.max_image_dimension) {
            return Err(UploadError::dimensions_exceeded(
                dimensions,
                self.limits.max_image_dimension,
            ));
        }

        let upload_id = Uuid::new_v4();
        let source = Arc::new(SourceImage {
            data: request.data,
            format,
            dimensions,
        });

        let tasks = self
            .profiles
            .iter()
            .map(|profile| self.process_profile(upload_id, Arc::clone(&source), *profile));
        let results = join_all(tasks).await;

        let mut stored = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(asset) => stored.push(asset),
                Err(failure) => failures.push(failure),
            }
        }

        if !failures.is_empty() {
            let mut keys: Vec<String> = stored.iter().map(|a| a.key.clone()).collect();
            keys.extend(failures.iter().map(|f| f.key.clone()));
            self.rollback(upload_id, &keys).await;

            let first = failures.remove(0);
            tracing::error!(
                upload_id = %upload_id,
                failed_profiles = failures.len() + 1,
                error = %first.error,
                "Upload aborted, storage failed"
            );
            return Err(first.error);
        }

        let urls: BTreeMap<String, String> = stored
            .iter()
            .map(|a| (a.size.clone(), a.url.clone()))
            .collect();

        let canonical_url = urls
            .get(CANONICAL_PROFILE)
            .or_else(|| stored.first().map(|a| &a.url))
            .cloned()
            .unwrap_or_default();

        tracing::info!(
            upload_id = %upload_id,
            format = %format,
            width = dimensions.width,
            height = dimensions.height,
            derivatives = stored.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload stored"
        );

        Ok(UploadOutcome {
            canonical_url,
            urls,
            assets: stored,
        })
    }

    async fn process_profile(
        &self,
        upload_id: Uuid,
        source: Arc<SourceImage>,
        profile: SizeProfile,
    ) -> Result<StoredAsset, FailedDerivative> {
        let resize_source = Arc::clone(&source);
        let derivative =
            match tokio::task::spawn_blocking(move || ImageResizer::resize(&resize_source, &profile))
                .await
            {
                Ok(derivative) => derivative,
                Err(e) => {
                    tracing::warn!(error = %e, size = profile.name, "Resize task failed, storing original bytes");
                    ImageResizer::fallback(&source, &profile)
                }
            };

        let key = derivative_key(
            self.storage.backend_type(),
            upload_id,
            &derivative.size,
            &derivative.extension,
        );

        let put = self
            .storage
            .put(&key, derivative.bytes, &derivative.content_type);
        let outcome = tokio::time::timeout(self.storage_timeout, put).await;

        match outcome {
            Ok(Ok(url)) => Ok(StoredAsset {
                size: derivative.size,
                key,
                url,
            }),
            Ok(Err(e)) => Err(FailedDerivative {
                key,
                error: UploadError::from(e),
            }),
            Err(_) => {
                tracing::warn!(
                    key = %key,
                    timeout_secs = self.storage_timeout.as_secs_f64(),
                    "Storage put timed out"
                );
                Err(FailedDerivative {
                    key,
                    error: UploadError::StorageUnavailable(format!(
                        "storage put timed out after {:?}",
                        self.storage_timeout
                    )),
                })
            }
        }
    }

    /// Delete the derivatives of a failed upload. Failures are logged only.
    async fn rollback(&self, upload_id: Uuid, keys: &[String]) {
        let deletions = keys.iter().map(|key| async move {
            match tokio::time::timeout(self.storage_timeout, self.storage.delete(key)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(upload_id = %upload_id, key = %key, error = %e, "Rollback delete failed")
                }
                Err(_) => {
                    tracing::warn!(upload_id = %upload_id, key = %key, "Rollback delete timed out")
                }
            }
        });
        join_all(deletions).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use eventflyer_core::models::{OutputFormat, TargetBox};
    use eventflyer_core::{S3Settings, StorageBackend};
    use eventflyer_storage::{LocalStorage, S3Storage, StorageError, StorageResult};
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn png(width: u32, height: u32) -> Bytes {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        Bytes::from(buf.into_inner())
    }

    async fn local_orchestrator() -> (tempfile::TempDir, Arc<LocalStorage>, UploadOrchestrator) {
        let dir = tempdir().unwrap();
        let storage = Arc::new(
            LocalStorage::new(dir.path(), "/uploads".to_string())
                .await
                .unwrap(),
        );
        let orchestrator = UploadOrchestrator::new(storage.clone(), UploadLimits::default());
        (dir, storage, orchestrator)
    }

    /// Local storage that fails every put of one profile
    struct FailingStorage {
        inner: LocalStorage,
        fail_size: &'static str,
        slow: bool,
        puts: AtomicUsize,
    }

    #[async_trait]
    impl Storage for FailingStorage {
        async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<String> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            if key.contains(&format!("_{}.", self.fail_size)) {
                if self.slow {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
                return Err(StorageError::UploadFailed("bucket unreachable".to_string()));
            }
            self.inner.put(key, data, content_type).await
        }

        async fn get(&self, key: &str) -> StorageResult<Bytes> {
            self.inner.get(key).await
        }

        async fn delete(&self, key: &str) -> StorageResult<()> {
            self.inner.delete(key).await
        }

        async fn exists(&self, key: &str) -> StorageResult<bool> {
            self.inner.exists(key).await
        }

        fn url_for(&self, key: &str) -> String {
            self.inner.url_for(key)
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::Local
        }
    }

    fn stored_files(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_upload_stores_every_profile() {
        let (dir, storage, orchestrator) = local_orchestrator().await;

        let outcome = orchestrator
            .handle_upload(UploadRequest::new(png(800, 400), "image/png"))
            .await
            .unwrap();

        let names: Vec<&str> = outcome.urls.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["large", "medium", "original", "thumbnail"]);
        assert_eq!(outcome.canonical_url, outcome.urls["medium"]);
        assert_eq!(outcome.assets.len(), 4);
        assert_eq!(stored_files(dir.path()), 4);

        for asset in &outcome.assets {
            assert!(storage.exists(&asset.key).await.unwrap());
            assert_eq!(asset.url, format!("/uploads/{}", asset.key));
        }
    }

    #[tokio::test]
    async fn test_keys_share_one_upload_id() {
        let (_dir, _storage, orchestrator) = local_orchestrator().await;

        let outcome = orchestrator
            .handle_upload(UploadRequest::new(png(64, 64), "image/png"))
            .await
            .unwrap();

        let ids: Vec<&str> = outcome
            .assets
            .iter()
            .map(|a| a.key.split('_').next().unwrap())
            .collect();
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert!(Uuid::parse_str(ids[0]).is_ok());

        for asset in &outcome.assets {
            assert_eq!(asset.key, format!("{}_{}.jpg", ids[0], asset.size));
        }
    }

    #[tokio::test]
    async fn test_derivatives_fit_their_boxes() {
        let (_dir, storage, orchestrator) = local_orchestrator().await;

        let outcome = orchestrator
            .handle_upload(UploadRequest::new(png(1600, 1200), "image/png"))
            .await
            .unwrap();

        let thumbnail = outcome.assets.iter().find(|a| a.size == "thumbnail").unwrap();
        let bytes = storage.get(&thumbnail.key).await.unwrap();
        let (_, dims) = sniff(&bytes).unwrap();
        assert_eq!((dims.width, dims.height), (300, 225));

        let original = outcome.assets.iter().find(|a| a.size == "original").unwrap();
        let (_, dims) = sniff(&storage.get(&original.key).await.unwrap()).unwrap();
        assert_eq!((dims.width, dims.height), (1600, 1200));
    }

    #[tokio::test]
    async fn test_rejects_invalid_type_before_reading_bytes() {
        let (dir, _storage, orchestrator) = local_orchestrator().await;

        let err = orchestrator
            .handle_upload(UploadRequest::new(png(10, 10), "image/svg+xml"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::InvalidType { .. }));
        assert_eq!(stored_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_rejects_too_large() {
        let (_dir, storage, _) = local_orchestrator().await;
        let orchestrator = UploadOrchestrator::new(
            storage,
            UploadLimits {
                max_file_size: 100,
                max_image_dimension: 1920,
            },
        );

        let err = orchestrator
            .handle_upload(UploadRequest::new(vec![0u8; 101], "image/jpeg"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { size: 101, max: 100 }));
    }

    #[tokio::test]
    async fn test_six_megabyte_png_exceeds_default_limit() {
        let (dir, _storage, orchestrator) = local_orchestrator().await;

        let mut data = png(64, 64).to_vec();
        data.resize(6 * 1024 * 1024, 0);

        let err = orchestrator
            .handle_upload(UploadRequest::new(data, "image/png"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { .. }));
        assert_eq!(err.to_string(), "File too large. Maximum size is 5MB.");
        assert_eq!(stored_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_rejects_unreadable_and_oversized_images() {
        let (dir, _storage, orchestrator) = local_orchestrator().await;

        let err = orchestrator
            .handle_upload(UploadRequest::new(Bytes::from_static(b"not an image"), "image/png"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::InvalidImage { .. }));

        let err = orchestrator
            .handle_upload(UploadRequest::new(Bytes::new(), "image/png"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::InvalidImage { .. }));

        let err = orchestrator
            .handle_upload(UploadRequest::new(png(1921, 10), "image/png"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("1920x1920"));

        assert_eq!(stored_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_rolls_back_stored_derivatives() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(FailingStorage {
            inner: LocalStorage::new(dir.path(), "/uploads".to_string())
                .await
                .unwrap(),
            fail_size: "large",
            slow: false,
            puts: AtomicUsize::new(0),
        });
        let orchestrator = UploadOrchestrator::new(storage.clone(), UploadLimits::default());

        let err = orchestrator
            .handle_upload(UploadRequest::new(png(100, 100), "image/png"))
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::StorageUnavailable(_)));
        assert_eq!(storage.puts.load(Ordering::SeqCst), 4);
        assert_eq!(stored_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_unreachable_bucket_is_storage_unavailable() {
        let storage = Arc::new(
            S3Storage::new(&S3Settings {
                bucket: "flyers".to_string(),
                access_key_id: "AKIATEST".to_string(),
                secret_access_key: Some("secret".to_string()),
                region: "us-east-1".to_string(),
                endpoint: Some("http://127.0.0.1:1".to_string()),
                public_base_url: None,
            })
            .unwrap(),
        );
        let orchestrator = UploadOrchestrator::new(storage, UploadLimits::default());

        let start = Instant::now();
        let err = orchestrator
            .handle_upload(UploadRequest::new(png(50, 50), "image/png"))
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::StorageUnavailable(_)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_storage_timeout_is_storage_unavailable() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(FailingStorage {
            inner: LocalStorage::new(dir.path(), "/uploads".to_string())
                .await
                .unwrap(),
            fail_size: "thumbnail",
            slow: true,
            puts: AtomicUsize::new(0),
        });
        let orchestrator = UploadOrchestrator::new(storage, UploadLimits::default())
            .with_storage_timeout(Duration::from_millis(500));

        let err = orchestrator
            .handle_upload(UploadRequest::new(png(20, 20), "image/gif; x=y"))
            .await;
        // declared GIF but the bytes are PNG: the sniffed format drives decoding
        let err = err.unwrap_err();
        assert!(matches!(err, UploadError::StorageUnavailable(ref msg) if msg.contains("timed out")));
        assert_eq!(stored_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_custom_profiles_without_canonical_use_first() {
        let (_dir, storage, _) = local_orchestrator().await;
        let orchestrator = UploadOrchestrator::new(storage, UploadLimits::default()).with_profiles(vec![
            SizeProfile {
                name: "banner",
                target: Some(TargetBox {
                    width: 50,
                    height: 20,
                }),
                quality: 70,
                output_format: OutputFormat::Png,
            },
        ]);

        let outcome = orchestrator
            .handle_upload(UploadRequest::new(png(200, 200), "image/png"))
            .await
            .unwrap();
        assert_eq!(outcome.urls.len(), 1);
        assert!(outcome.canonical_url.ends_with("_banner.png"));
    }
}
