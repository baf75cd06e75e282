//! EventFlyer Processing Library
//!
//! Flyer upload processing: header sniffing, derivative resizing and encoding,
//! upload validation, and the orchestrator that stores every derivative.

pub mod compression;
pub mod image;
pub mod sniff;
pub mod upload;
pub mod validator;

pub use self::image::{Derivative, ImageResize, ImageResizer, SourceImage};
pub use sniff::{sniff, SniffError};
pub use upload::{UploadError, UploadLimits, UploadOrchestrator, UploadRequest};
pub use validator::{UploadValidator, ValidationError};
