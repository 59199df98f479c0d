use notiroute_registry::{Capability, Domain, Registry, Route};
use notiroute_schema::{Message, SchemaStore};

use crate::catalog::Catalog;

pub(crate) const MOBILE_SCHEMA: &str = r#"{
    "type": "object",
    "required": ["title", "body"],
    "properties": {
        "title": { "type": "string", "maxLength": 25 },
        "body": { "type": "string", "maxLength": 100 },
        "action_url": { "type": "string", "pattern": "^(https?://|myworkspace://).+" },
        "priority": { "type": "string", "enum": ["high", "normal", "low"] },
        "badge_count": { "type": "integer", "minimum": 0, "maximum": 99 }
    },
    "additionalProperties": false
}"#;

pub(crate) const DESKTOP_SCHEMA: &str = r#"{
    "type": "object",
    "required": ["title", "body"],
    "properties": {
        "header": { "type": "string", "maxLength": 50 },
        "title": { "type": "string", "maxLength": 100 },
        "body": { "type": "string", "maxLength": 1000 },
        "footer": { "type": "string", "maxLength": 200 },
        "icon": { "type": "string" },
        "priority": { "type": "string", "enum": ["high", "normal", "low"] }
    }
}"#;

/// Two domains, mobile and desktop routes, and `book_a_seat` allowed on both.
/// `email.myworkspace` is registered but not authorized for any capability.
pub(crate) fn workspace_catalog() -> Catalog {
    let mut registry = Registry::new();
    registry.register_domain(Domain::new("mobile.push.jpmc", "Mobile Platform Team", "FCM"));
    registry.register_domain(Domain::new("desktop.rich.jpmc", "Desktop Experience Team", "WNS"));
    registry.register_domain(Domain::new("email.jpmc", "Messaging Team", "SMTP"));
    registry.register_route(Route::new("mobile.myworkspace", "mobile.push.jpmc", "mobile.push.v1"));
    registry.register_route(Route::new("desktop.myworkspace", "desktop.rich.jpmc", "desktop.rich.v1"));
    registry.register_route(Route::new("email.myworkspace", "email.jpmc", "desktop.rich.v1"));
    registry.register_capability(
        Capability::new("book_a_seat", "Workspace reservation")
            .with_route("mobile.myworkspace")
            .with_route("desktop.myworkspace"),
    );

    let schemas = SchemaStore::from_embedded(&[
        ("mobile.push.v1", MOBILE_SCHEMA),
        ("desktop.rich.v1", DESKTOP_SCHEMA),
    ])
    .unwrap();

    Catalog::new(registry, schemas)
}

pub(crate) fn booking_mobile() -> Message {
    Message::new()
        .with("title", "Seat Reserved")
        .with("body", "Desk 42A booked")
        .with("action_url", "myworkspace://booking/123")
        .with("priority", "high")
        .with("badge_count", 1)
}

pub(crate) fn booking_desktop() -> Message {
    Message::new()
        .with("header", "JPMC Workspace")
        .with("title", "Workspace Reservation Confirmed")
        .with("body", "Your desk 42A on floor 12 is booked for tomorrow.")
        .with("footer", "Questions? Contact facilities@jpmc.com")
        .with("priority", "normal")
}

pub(crate) fn invalid_mobile() -> Message {
    Message::new()
        .with(
            "title",
            "This title is way too long for mobile and will fail validation!!!!!!",
        )
        .with("body", "Test")
        .with("badge_count", 999)
        .with("priority", "invalid_priority")
}
