//! Multipart helpers for the upload handler

use axum::extract::Multipart;
use bytes::Bytes;
use eventflyer_core::AppError;

/// File part of an upload form
#[derive(Debug)]
pub struct UploadedFile {
    pub data: Bytes,
    pub file_name: Option<String>,
    pub content_type: String,
}

/// Extract the field named "file" from a multipart form.
/// Only one such field is accepted; other fields are ignored.
pub async fn extract_multipart_file(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        if file.is_some() {
            return Err(AppError::BadRequest(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?;

        file = Some(UploadedFile {
            data,
            file_name,
            content_type,
        });
    }

    file.ok_or_else(|| AppError::BadRequest("No file".to_string()))
}
