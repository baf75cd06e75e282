//! Field validators used by the event request DTOs

use chrono::NaiveDate;
use validator::{ValidateUrl, ValidationError};

use crate::error::AppError;

const EVENT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an event date in `yyyy-mm-dd` form.
pub fn parse_event_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), EVENT_DATE_FORMAT)
        .map_err(|_| AppError::InvalidInput(format!("Invalid event date: {}", value)))
}

pub fn validate_event_date(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("date_required"));
    }
    NaiveDate::parse_from_str(value.trim(), EVENT_DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| ValidationError::new("date_format"))
}

/// Flyer URLs are either absolute or path-relative (local storage serves
/// flyers under `/uploads`).
pub fn validate_flyer_url(value: &str) -> Result<(), ValidationError> {
    if value.starts_with('/') && !value.starts_with("//") && value.len() > 1 {
        return Ok(());
    }
    if value.validate_url() {
        return Ok(());
    }
    Err(ValidationError::new("flyer_url"))
}
