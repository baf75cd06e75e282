//! Event repositories
//
// Repository trait and factory
pub mod event;
//
// In-memory store for development and tests
pub mod memory;
//
// Postgres store
pub mod postgres;

pub use event::{create_event_repository, EventRepository};
pub use memory::InMemoryEventRepository;
pub use postgres::PgEventRepository;
