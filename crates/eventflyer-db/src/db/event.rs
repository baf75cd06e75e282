use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use eventflyer_core::{
    models::{Event, EventChanges, NewEvent},
    AppError,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::{InMemoryEventRepository, PgEventRepository};

/// Event persistence
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// List events ordered by date ascending, then newest first within a day.
    async fn list(&self, published_only: bool) -> Result<Vec<Event>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Event>, AppError>;

    async fn create(&self, event: NewEvent) -> Result<Event, AppError>;

    /// Apply a partial update. Returns `None` if the event does not exist.
    async fn update(&self, id: Uuid, changes: EventChanges) -> Result<Option<Event>, AppError>;

    /// Returns `false` if the event did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Listing order shared by every implementation
pub(crate) fn listing_order(a: &Event, b: &Event) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Pick the repository for the configured database, in-memory when there is none
pub fn create_event_repository(pool: Option<PgPool>) -> Arc<dyn EventRepository> {
    match pool {
        Some(pool) => {
            tracing::info!("Initializing PostgreSQL event repository");
            Arc::new(PgEventRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, events are kept in memory only");
            Arc::new(InMemoryEventRepository::new())
        }
    }
}
