//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Errors render as a plain-text
//! client message with the machine-readable code in the `x-error-code` header.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use eventflyer_core::{AppError, ErrorMetadata, LogLevel};
use eventflyer_processing::UploadError;
use serde::de::DeserializeOwned;

pub const ERROR_CODE_HEADER: &str = "x-error-code";

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from eventflyer-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

/// Malformed JSON bodies get the same generic answer as invalid events.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(rejection = %rejection.body_text(), "Rejected JSON body");
        HttpAppError(AppError::BadRequest("Bad request".to_string()))
    }
}

impl From<UploadError> for HttpAppError {
    fn from(err: UploadError) -> Self {
        let message = err.to_string();
        let app = match err {
            UploadError::InvalidType { .. } => AppError::InvalidInput(message),
            UploadError::TooLarge { .. } => AppError::PayloadTooLarge(message),
            UploadError::InvalidImage { .. } => AppError::ImageProcessing(message),
            UploadError::StorageUnavailable(_) => AppError::Storage(message),
            UploadError::Io(e) => AppError::from(e),
        };
        HttpAppError(app)
    }
}

/// JSON body extractor that answers 400 "Bad request" on deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                error_type = error_type,
                details = %error.detailed_message(),
                "Error occurred"
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let mut response = (status, app_error.client_message()).into_response();
        response.headers_mut().insert(
            ERROR_CODE_HEADER,
            HeaderValue::from_static(app_error.error_code()),
        );
        response
    }
}
