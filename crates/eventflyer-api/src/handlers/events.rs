//! Event listing and admin CRUD handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use eventflyer_core::{
    models::{CreateEventRequest, Event, UpdateEventRequest},
    AppError,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::verify_admin;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    /// Presence alone selects the admin listing
    #[serde(default)]
    pub admin: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventIdQuery {
    #[serde(default)]
    pub id: Option<String>,
}

fn event_id(query: &EventIdQuery) -> Result<Uuid, AppError> {
    let id = query
        .id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Event ID required".to_string()))?;

    Uuid::parse_str(id.trim()).map_err(|_| AppError::BadRequest("Invalid event ID".to_string()))
}

/// Validation failures are logged in full but answered with a generic message.
fn bad_request(err: AppError) -> AppError {
    tracing::debug!(error = %err, "Event payload rejected");
    match err {
        AppError::InvalidInput(_) | AppError::BadRequest(_) => {
            AppError::BadRequest("Bad request".to_string())
        }
        other => other,
    }
}

/// List events
///
/// Public callers see published events only. With `?admin` and a valid admin token
/// every event is listed.
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "events",
    params(
        ("admin" = Option<String>, Query, description = "Present to list unpublished events too (admin only)")
    ),
    responses(
        (status = 200, description = "Events ordered by date, newest first within a day", body = Vec<Event>),
        (status = 401, description = "Admin listing without a valid token", body = String)
    )
)]
#[tracing::instrument(skip(state, headers), fields(admin = query.admin.is_some()))]
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<Event>>, HttpAppError> {
    let published_only = if query.admin.is_some() {
        verify_admin(&headers, state.config.admin_token())?;
        false
    } else {
        true
    };

    let events = state.events.list(published_only).await?;
    Ok(Json(events))
}

/// Create an event
#[utoipa::path(
    post,
    path = "/api/events",
    tag = "events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Bad request", body = String),
        (status = 401, description = "Missing or wrong admin token", body = String)
    ),
    security(("admin_token" = []))
)]
#[tracing::instrument(skip(state, request), fields(title = %request.title))]
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateEventRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let new_event = request.into_new_event().map_err(bad_request)?;
    let event = state.events.create(new_event).await?;

    tracing::info!(event_id = %event.id, slug = %event.slug, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// Update an event
///
/// Only the fields present in the body change. The slug is kept.
#[utoipa::path(
    put,
    path = "/api/events",
    tag = "events",
    params(
        ("id" = String, Query, description = "Event ID")
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Missing ID or bad request", body = String),
        (status = 401, description = "Missing or wrong admin token", body = String),
        (status = 404, description = "Event not found", body = String)
    ),
    security(("admin_token" = []))
)]
#[tracing::instrument(skip(state, request), fields(event_id = ?query.id))]
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventIdQuery>,
    ValidatedJson(request): ValidatedJson<UpdateEventRequest>,
) -> Result<Json<Event>, HttpAppError> {
    let id = event_id(&query)?;
    let changes = request.into_changes().map_err(bad_request)?;

    let event = state
        .events
        .update(id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    tracing::info!(event_id = %event.id, "Event updated");
    Ok(Json(event))
}

/// Delete an event
#[utoipa::path(
    delete,
    path = "/api/events",
    tag = "events",
    params(
        ("id" = String, Query, description = "Event ID")
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 400, description = "Missing ID", body = String),
        (status = 401, description = "Missing or wrong admin token", body = String),
        (status = 404, description = "Event not found", body = String)
    ),
    security(("admin_token" = []))
)]
#[tracing::instrument(skip(state), fields(event_id = ?query.id))]
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventIdQuery>,
) -> Result<StatusCode, HttpAppError> {
    let id = event_id(&query)?;

    if !state.events.delete(id).await? {
        return Err(AppError::NotFound("Event not found".to_string()).into());
    }

    tracing::info!(event_id = %id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}
