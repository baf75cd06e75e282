use eventflyer_core::constants::ALLOWED_IMAGE_TYPES;
use eventflyer_core::models::ImageFormat;

/// Upload validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid content type: {content_type}")]
    InvalidContentType { content_type: String },

    #[error("Empty file")]
    EmptyFile,
}

/// Upload request validator
///
/// Checks the declared MIME type and byte length before any image bytes are read.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl UploadValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self {
            max_file_size,
            allowed_content_types: ALLOWED_IMAGE_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Validate the declared content type. Parameters (`; charset=...`) and case are ignored.
    pub fn validate_content_type(&self, content_type: &str) -> Result<ImageFormat, ValidationError> {
        let normalized = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();

        let invalid = || ValidationError::InvalidContentType {
            content_type: content_type.to_string(),
        };

        if !self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            return Err(invalid());
        }

        ImageFormat::from_mime(&normalized).ok_or_else(invalid)
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        Ok(())
    }

    /// Validate content type then size
    pub fn validate_all(&self, content_type: &str, size: usize) -> Result<ImageFormat, ValidationError> {
        let format = self.validate_content_type(content_type)?;
        self.validate_file_size(size)?;
        Ok(format)
    }
}
