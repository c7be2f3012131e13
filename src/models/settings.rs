use serde_json::{json, Value};

use super::document::{from_value, Document};

/// Id of the single settings document in the document database.
pub const SETTINGS_ID: &str = "main-settings";

/// What a reader sees before anyone has saved settings locally.
pub fn fallback_settings() -> Document {
    from_value(json!({
        "siteName": "Portfolio",
        "siteDescription": "Professional Portfolio",
        "contactEmail": "contact@example.com",
    }))
    .unwrap_or_default()
}

/// Settings written by the seed.
pub fn seeded_settings() -> Document {
    from_value(json!({
        "profileImage": "",
        "resumeUrl": "",
        "linkedin": "https://linkedin.com/in/example",
        "github": "https://github.com/example",
        "instagram": "https://instagram.com/example",
        "email": "hello@example.com",
        "phone": "+1234567890",
        "whatsapp": "+1234567890",
    }))
    .unwrap_or_default()
}

/// The settings document as the HTTP layer returns it: empty object when absent.
pub fn or_empty(settings: Option<Document>) -> Value {
    Value::Object(settings.unwrap_or_default())
}
