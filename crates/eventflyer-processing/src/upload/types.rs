use bytes::Bytes;
use eventflyer_core::constants::{DEFAULT_MAX_FILE_SIZE_MB, DEFAULT_MAX_IMAGE_DIMENSION};
use eventflyer_core::models::ImageDimensions;
use eventflyer_storage::StorageError;

use crate::sniff::SniffError;
use crate::validator::ValidationError;

/// Raw upload as received from the client
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub data: Bytes,
    /// MIME type declared by the client
    pub content_type: String,
}

impl UploadRequest {
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Limits enforced before any derivative is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_size: usize,
    pub max_image_dimension: u32,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
            max_image_dimension: DEFAULT_MAX_IMAGE_DIMENSION,
        }
    }
}

/// Upload failures. Display strings are client-facing.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid file type. Only JPEG, PNG, WebP, and GIF images are allowed.")]
    InvalidType { content_type: String },

    #[error("File too large. Maximum size is {}MB.", format_megabytes(.max))]
    TooLarge { size: usize, max: usize },

    #[error("{reason}")]
    InvalidImage {
        reason: String,
        #[source]
        source: Option<SniffError>,
    },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),
}

const UNREADABLE_IMAGE: &str = "Invalid image file or unable to read dimensions.";

impl UploadError {
    pub fn unreadable(source: Option<SniffError>) -> Self {
        UploadError::InvalidImage {
            reason: UNREADABLE_IMAGE.to_string(),
            source,
        }
    }

    pub fn dimensions_exceeded(dimensions: ImageDimensions, max: u32) -> Self {
        UploadError::InvalidImage {
            reason: format!(
                "Image dimensions too large. Maximum dimensions are {}x{} pixels (got {}x{}).",
                max, max, dimensions.width, dimensions.height
            ),
            source: None,
        }
    }

    /// Whether the failure was caused by the client's upload rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            UploadError::InvalidType { .. }
                | UploadError::TooLarge { .. }
                | UploadError::InvalidImage { .. }
        )
    }
}

fn format_megabytes(bytes: &usize) -> String {
    const MB: usize = 1024 * 1024;
    let bytes = *bytes;
    if bytes % MB == 0 {
        (bytes / MB).to_string()
    } else {
        format!("{:.1}", bytes as f64 / MB as f64)
    }
}

impl From<ValidationError> for UploadError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidContentType { content_type } => {
                UploadError::InvalidType { content_type }
            }
            ValidationError::FileTooLarge { size, max } => UploadError::TooLarge { size, max },
            ValidationError::EmptyFile => UploadError::unreadable(None),
        }
    }
}

impl From<StorageError> for UploadError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::IoError(e) => UploadError::Io(e),
            other => UploadError::StorageUnavailable(other.to_string()),
        }
    }
}
