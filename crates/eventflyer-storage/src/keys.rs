//! Shared key generation for storage backends.
//!
//! Key format: `<prefix><upload_id>_<size>.<ext>`, prefix `flyers/` on the object store.

use eventflyer_core::StorageBackend;
use uuid::Uuid;

/// Generate the storage key of one derivative of an upload.
///
/// Every derivative of the same upload shares `upload_id`, so a key is unique
/// per (upload, size) pair.
pub fn derivative_key(backend: StorageBackend, upload_id: Uuid, size: &str, ext: &str) -> String {
    format!("{}{}_{}.{}", backend.key_prefix(), upload_id, size, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_store_keys_are_prefixed() {
        let id = Uuid::nil();
        assert_eq!(
            derivative_key(StorageBackend::S3, id, "medium", "jpg"),
            "flyers/00000000-0000-0000-0000-000000000000_medium.jpg"
        );
    }

    #[test]
    fn test_local_keys_have_no_prefix() {
        let id = Uuid::new_v4();
        let key = derivative_key(StorageBackend::Local, id, "thumbnail", "jpg");
        assert_eq!(key, format!("{}_thumbnail.jpg", id));
        assert!(!key.contains('/'));
    }
}
