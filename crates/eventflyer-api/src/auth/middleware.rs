use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use eventflyer_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

#[derive(Clone)]
pub struct AuthState {
    /// `None` denies every admin request
    pub admin_token: Option<String>,
}

impl AuthState {
    pub fn new(admin_token: Option<String>) -> Self {
        Self { admin_token }
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check the admin token header against the configured secret.
pub fn verify_admin(headers: &HeaderMap, expected: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = expected.filter(|t| !t.is_empty()) else {
        tracing::warn!("Admin request rejected: ADMIN_TOKEN is not configured");
        return Err(AppError::Unauthorized("Unauthorized".to_string()));
    };

    let provided = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if provided.is_empty() || !secure_compare(provided, expected) {
        return Err(AppError::Unauthorized("Unauthorized".to_string()));
    }

    Ok(())
}

pub async fn admin_auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(e) = verify_admin(request.headers(), auth_state.admin_token.as_deref()) {
        tracing::debug!(
            method = %request.method(),
            path = %request.uri().path(),
            "Admin authentication failed"
        );
        return HttpAppError::from(e).into_response();
    }

    next.run(request).await
}
