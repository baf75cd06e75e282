use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use eventflyer_core::models::UploadResponse;
use eventflyer_processing::UploadRequest;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

/// Upload a flyer image
///
/// Stores one derivative per size profile and returns their URLs. `url` is the
/// canonical (medium) URL to save as the event's `flyerUrl`.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Flyer stored in every size", body = UploadResponse),
        (status = 400, description = "Missing file, unsupported type or unreadable image", body = String),
        (status = 401, description = "Missing or wrong admin token", body = String),
        (status = 413, description = "File too large", body = String),
        (status = 500, description = "Storage failure", body = String)
    ),
    security(("admin_token" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_flyer"))]
pub async fn upload_flyer(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let file = extract_multipart_file(multipart).await?;

    tracing::debug!(
        file_name = ?file.file_name,
        content_type = %file.content_type,
        size_bytes = file.data.len(),
        "Received flyer upload"
    );

    let outcome = state
        .uploads
        .handle_upload(UploadRequest::new(file.data, file.content_type))
        .await?;

    Ok(Json(UploadResponse::from(outcome)))
}
