//! EventFlyer Core Library
//!
//! This crate provides the domain models, error types, configuration and validation
//! helpers shared by every EventFlyer component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod slug;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, EventFlyerConfig, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use slug::slugify;
pub use storage_types::{LocalSettings, S3Settings, StorageBackend, StorageSelection};
