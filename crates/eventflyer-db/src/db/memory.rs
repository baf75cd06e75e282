use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use eventflyer_core::{
    models::{Event, EventChanges, NewEvent},
    AppError,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::event::{listing_order, EventRepository};

/// Process-local event store. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryEventRepository {
    events: RwLock<HashMap<Uuid, Event>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn list(&self, published_only: bool) -> Result<Vec<Event>, AppError> {
        let events = self.events.read().await;
        let mut listed: Vec<Event> = events
            .values()
            .filter(|e| !published_only || e.is_published)
            .cloned()
            .collect();
        listed.sort_by(listing_order);
        Ok(listed)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        Ok(self.events.read().await.get(&id).cloned())
    }

    async fn create(&self, event: NewEvent) -> Result<Event, AppError> {
        let event = event.into_event(Utc::now());
        self.events.write().await.insert(event.id, event.clone());
        tracing::debug!(event_id = %event.id, slug = %event.slug, "Event created");
        Ok(event)
    }

    async fn update(&self, id: Uuid, changes: EventChanges) -> Result<Option<Event>, AppError> {
        let mut events = self.events.write().await;
        let Some(event) = events.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(event, Utc::now());
        Ok(Some(event.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.events.write().await.remove(&id).is_some())
    }
}
