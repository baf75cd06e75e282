//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::ADMIN_TOKEN_HEADER;
use crate::handlers;
use eventflyer_core::models;

struct AdminTokenScheme;

impl Modify for AdminTokenScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ADMIN_TOKEN_HEADER))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EventFlyer API",
        version = "0.1.0",
        description = "Event promotion API: public event listing, admin event management and flyer uploads resized to thumbnail, medium, large and original."
    ),
    paths(
        // Events
        handlers::events::list_events,
        handlers::events::create_event,
        handlers::events::update_event,
        handlers::events::delete_event,
        // Uploads
        handlers::upload::upload_flyer,
        // Health
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::Event,
            models::CreateEventRequest,
            models::UpdateEventRequest,
            models::UploadResponse,
            handlers::health::HealthResponse,
        )
    ),
    modifiers(&AdminTokenScheme),
    tags(
        (name = "events", description = "Event listing and admin management"),
        (name = "uploads", description = "Flyer image uploads"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_route() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/api/events"));
        assert!(spec.paths.paths.contains_key("/api/upload"));
        assert!(spec.paths.paths.contains_key("/health"));

        let components = spec.components.expect("components");
        assert!(components.schemas.contains_key("Event"));
        assert!(components.security_schemes.contains_key("admin_token"));
    }
}
