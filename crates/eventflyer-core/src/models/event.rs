use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::slug::slugify;
use crate::validation::{parse_event_date, validate_event_date, validate_flyer_url};

/// A promoted event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Calendar date of the event (`yyyy-mm-dd`)
    #[schema(example = "2025-06-21")]
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: String,
    pub ticket_url: String,
    pub flyer_url: String,
    pub is_published: bool,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating an event
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(custom(function = "validate_event_date"))]
    #[schema(example = "2025-06-21")]
    pub date: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(url(message = "Ticket URL must be an absolute URL"))]
    pub ticket_url: String,
    #[validate(custom(function = "validate_flyer_url"))]
    pub flyer_url: String,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

/// A field that is in the body, possibly `null`. Missing fields fall back to `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request DTO for a partial event update. Absent fields are left unchanged;
/// `description`, `startTime` and `endTime` are cleared by an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    #[validate(custom(function = "validate_event_date"))]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub start_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub end_time: Option<Option<String>>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(url(message = "Ticket URL must be an absolute URL"))]
    pub ticket_url: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_flyer_url"))]
    pub flyer_url: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
}

/// A validated event ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: String,
    pub ticket_url: String,
    pub flyer_url: String,
    pub is_published: bool,
    pub slug: String,
}

/// A validated partial update. `Some(None)` clears an optional column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<Option<String>>,
    pub end_time: Option<Option<String>>,
    pub location: Option<String>,
    pub ticket_url: Option<String>,
    pub flyer_url: Option<String>,
    pub is_published: Option<bool>,
}

impl CreateEventRequest {
    /// Validate the request and derive the stored slug from `title-date`.
    pub fn into_new_event(self) -> Result<NewEvent, AppError> {
        self.validate()?;
        let date = parse_event_date(&self.date)?;
        let slug = slugify(&format!("{}-{}", self.title, self.date));

        Ok(NewEvent {
            title: self.title,
            description: self.description,
            date,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location,
            ticket_url: self.ticket_url,
            flyer_url: self.flyer_url,
            is_published: self.is_published,
            slug,
        })
    }
}

impl UpdateEventRequest {
    pub fn into_changes(self) -> Result<EventChanges, AppError> {
        self.validate()?;
        let date = self.date.as_deref().map(parse_event_date).transpose()?;

        Ok(EventChanges {
            title: self.title,
            description: self.description,
            date,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location,
            ticket_url: self.ticket_url,
            flyer_url: self.flyer_url,
            is_published: self.is_published,
        })
    }
}

impl NewEvent {
    /// Materialize the event with a fresh id and timestamps.
    pub fn into_event(self, now: DateTime<Utc>) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location,
            ticket_url: self.ticket_url,
            flyer_url: self.flyer_url,
            is_published: self.is_published,
            slug: self.slug,
            created_at: now,
            updated_at: now,
        }
    }
}

impl EventChanges {
    /// Apply the changes in place and refresh `updated_at`. The slug is kept.
    pub fn apply_to(self, event: &mut Event, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(start_time) = self.start_time {
            event.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            event.end_time = end_time;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(ticket_url) = self.ticket_url {
            event.ticket_url = ticket_url;
        }
        if let Some(flyer_url) = self.flyer_url {
            event.flyer_url = flyer_url;
        }
        if let Some(is_published) = self.is_published {
            event.is_published = is_published;
        }
        event.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_request() -> CreateEventRequest {
        serde_json::from_value(serde_json::json!({
            "title": "Summer Rooftop Party",
            "date": "2025-06-21",
            "location": "Rooftop Bar",
            "ticketUrl": "https://tickets.example.com/summer",
            "flyerUrl": "/uploads/abc_medium.jpg"
        }))
        .unwrap()
    }

    #[test]
    fn test_create_request_defaults_to_published() {
        let request = create_request();
        assert!(request.is_published);
        assert!(request.description.is_none());
    }

    #[test]
    fn test_into_new_event_derives_slug() {
        let event = create_request().into_new_event().unwrap();
        assert_eq!(event.slug, "summer-rooftop-party-2025-06-21");
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2025, 6, 21).unwrap());
    }

    #[test]
    fn test_into_new_event_rejects_invalid_fields() {
        let mut request = create_request();
        request.title = String::new();
        assert!(request.into_new_event().is_err());

        let mut request = create_request();
        request.date = "21/06/2025".to_string();
        assert!(request.into_new_event().is_err());

        let mut request = create_request();
        request.ticket_url = "tickets".to_string();
        assert!(request.into_new_event().is_err());

        let mut request = create_request();
        request.flyer_url = "uploads/relative.jpg".to_string();
        assert!(request.into_new_event().is_err());
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let event = create_request()
            .into_new_event()
            .unwrap()
            .into_event(Utc::now());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["date"], "2025-06-21");
        assert_eq!(json["isPublished"], true);
        assert!(json.get("ticketUrl").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("is_published").is_none());
    }

    #[test]
    fn test_changes_apply_keeps_slug_and_refreshes_updated_at() {
        let created = Utc::now();
        let mut event = create_request()
            .into_new_event()
            .unwrap()
            .into_event(created);

        let changes = UpdateEventRequest {
            title: Some("Renamed".to_string()),
            is_published: Some(false),
            ..Default::default()
        }
        .into_changes()
        .unwrap();

        let later = created + Duration::seconds(5);
        changes.apply_to(&mut event, later);

        assert_eq!(event.title, "Renamed");
        assert!(!event.is_published);
        assert_eq!(event.slug, "summer-rooftop-party-2025-06-21");
        assert_eq!(event.updated_at, later);
        assert_eq!(event.created_at, created);
    }

    #[test]
    fn test_null_clears_optional_fields_and_absent_keeps_them() {
        let mut request = create_request();
        request.description = Some("Open air".to_string());
        request.start_time = Some("22:00".to_string());
        request.end_time = Some("04:00".to_string());
        let mut event = request.into_new_event().unwrap().into_event(Utc::now());

        let request: UpdateEventRequest = serde_json::from_value(serde_json::json!({
            "description": null,
            "startTime": null
        }))
        .unwrap();
        assert_eq!(request.description, Some(None));
        assert_eq!(request.end_time, None);

        request.into_changes().unwrap().apply_to(&mut event, Utc::now());

        assert_eq!(event.description, None);
        assert_eq!(event.start_time, None);
        assert_eq!(event.end_time.as_deref(), Some("04:00"));
    }

    #[test]
    fn test_update_request_sets_optional_field() {
        let request: UpdateEventRequest =
            serde_json::from_value(serde_json::json!({ "endTime": "05:00" })).unwrap();
        assert_eq!(request.end_time, Some(Some("05:00".to_string())));
        assert_eq!(request.description, None);
    }

    #[test]
    fn test_update_request_validates_present_fields() {
        let request = UpdateEventRequest {
            date: Some("2025-13-40".to_string()),
            ..Default::default()
        };
        assert!(request.into_changes().is_err());
    }
}
