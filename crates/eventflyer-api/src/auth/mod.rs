//! Admin authentication
pub mod middleware;

pub use middleware::{admin_auth_middleware, verify_admin, AuthState, ADMIN_TOKEN_HEADER};
