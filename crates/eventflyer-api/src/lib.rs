//! EventFlyer API Library
//!
//! This crate provides the HTTP handlers, admin middleware, and application setup.

mod api_doc;
mod handlers;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use state::AppState;
