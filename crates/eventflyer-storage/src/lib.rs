//! EventFlyer Storage Library
//!
//! This crate provides the storage abstraction for flyer derivatives and its two
//! implementations: an S3-compatible object store and the local filesystem.
//!
//! # Storage key format
//!
//! All backends share one key layout: `<prefix><upload_id>_<size>.<ext>`, where the
//! prefix is `flyers/` on the object store and empty on local disk.
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use eventflyer_core::StorageBackend;
pub use factory::create_storage;
pub use keys::derivative_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
