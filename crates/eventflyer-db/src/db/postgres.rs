use async_trait::async_trait;
use chrono::Utc;
use eventflyer_core::{
    models::{Event, EventChanges, NewEvent},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::EventRepository;

const EVENT_COLUMNS: &str = "id, title, description, date, start_time, end_time, location, \
     ticket_url, flyer_url, is_published, slug, created_at, updated_at";

/// Repository for events stored in Postgres
#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    #[tracing::instrument(skip(self), fields(db.table = "events", db.operation = "select"))]
    async fn list(&self, published_only: bool) -> Result<Vec<Event>, AppError> {
        let sql = if published_only {
            format!(
                "SELECT {} FROM events WHERE is_published = TRUE ORDER BY date ASC, created_at DESC",
                EVENT_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM events ORDER BY date ASC, created_at DESC",
                EVENT_COLUMNS
            )
        };

        let events = sqlx::query_as::<Postgres, Event>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    #[tracing::instrument(skip(self), fields(db.table = "events", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let sql = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);
        let event = sqlx::query_as::<Postgres, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    #[tracing::instrument(skip(self, event), fields(db.table = "events", db.operation = "insert", slug = %event.slug))]
    async fn create(&self, event: NewEvent) -> Result<Event, AppError> {
        let event = event.into_event(Utc::now());
        let sql = format!(
            r#"
            INSERT INTO events ({})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            EVENT_COLUMNS, EVENT_COLUMNS
        );

        let created = sqlx::query_as::<Postgres, Event>(&sql)
            .bind(event.id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.date)
            .bind(&event.start_time)
            .bind(&event.end_time)
            .bind(&event.location)
            .bind(&event.ticket_url)
            .bind(&event.flyer_url)
            .bind(event.is_published)
            .bind(&event.slug)
            .bind(event.created_at)
            .bind(event.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "events", db.operation = "update", db.record_id = %id))]
    async fn update(&self, id: Uuid, changes: EventChanges) -> Result<Option<Event>, AppError> {
        // Absent fields bind as NULL and keep the stored value. The optional
        // columns carry a presence flag so an explicit null clears them.
        let sql = format!(
            r#"
            UPDATE events SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                date = COALESCE($5, date),
                start_time = CASE WHEN $6 THEN $7 ELSE start_time END,
                end_time = CASE WHEN $8 THEN $9 ELSE end_time END,
                location = COALESCE($10, location),
                ticket_url = COALESCE($11, ticket_url),
                flyer_url = COALESCE($12, flyer_url),
                is_published = COALESCE($13, is_published),
                updated_at = $14
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );

        let updated = sqlx::query_as::<Postgres, Event>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description.is_some())
            .bind(changes.description.flatten())
            .bind(changes.date)
            .bind(changes.start_time.is_some())
            .bind(changes.start_time.flatten())
            .bind(changes.end_time.is_some())
            .bind(changes.end_time.flatten())
            .bind(changes.location)
            .bind(changes.ticket_url)
            .bind(changes.flyer_url)
            .bind(changes.is_published)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    #[tracing::instrument(skip(self), fields(db.table = "events", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
