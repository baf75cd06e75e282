//! EventFlyer database layer
//!
//! Event persistence behind the [`EventRepository`] trait, with a Postgres
//! implementation and an in-memory one used when no database is configured.

pub mod db;

pub use db::{create_event_repository, EventRepository, InMemoryEventRepository, PgEventRepository};
