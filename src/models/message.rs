use serde::Deserialize;
use serde_json::Value;

use super::document::Document;

pub const LEAD_SUBJECT: &str = "Aura Assistant Lead";
pub const LEAD_SOURCE: &str = "aura-assistant";
const LEAD_DEFAULT_MESSAGE: &str = "Lead captured from Aura Assistant";

/// Contact form payload. Several site sections post slightly different
/// shapes, so every field is optional and has a fallback.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub source: Option<String>,
    pub message: Option<String>,
    pub body: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ContactSubmission {
    pub fn into_message(self) -> Document {
        let name = non_empty(&self.name)
            .or_else(|| non_empty(&self.full_name))
            .unwrap_or("Anonymous");
        let subject = non_empty(&self.subject)
            .or_else(|| non_empty(&self.source))
            .unwrap_or("Contact Form");
        let message = non_empty(&self.message)
            .or_else(|| non_empty(&self.body))
            .unwrap_or("");
        let source = non_empty(&self.source).unwrap_or("website");

        let mut doc = Document::new();
        doc.insert("name".into(), Value::from(name));
        doc.insert("email".into(), Value::from(non_empty(&self.email).unwrap_or("")));
        if let Some(phone) = non_empty(&self.phone) {
            doc.insert("phone".into(), Value::from(phone));
        }
        doc.insert("subject".into(), Value::from(subject));
        doc.insert("message".into(), Value::from(message));
        doc.insert("source".into(), Value::from(source));
        doc
    }
}

/// Name and email captured by the assistant after a few questions.
#[derive(Debug, Default, Deserialize)]
pub struct AuraLead {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    /// Conversation transcript, kept as sent.
    #[serde(default, rename = "chatHistory")]
    pub chat_history: Option<Value>,
}

impl AuraLead {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err("Name and email are required".to_string());
        }
        Ok(())
    }

    pub fn into_message(self) -> Document {
        let mut doc = Document::new();
        doc.insert("name".into(), Value::from(self.name.trim()));
        doc.insert("email".into(), Value::from(self.email.trim()));
        doc.insert(
            "phone".into(),
            Value::from(self.phone.unwrap_or_default()),
        );
        doc.insert("subject".into(), Value::from(LEAD_SUBJECT));
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| LEAD_DEFAULT_MESSAGE.to_string());
        doc.insert("message".into(), Value::from(message));
        doc.insert("source".into(), Value::from(LEAD_SOURCE));
        if let Some(history) = self.chat_history.filter(|h| !h.is_null()) {
            doc.insert("chatHistory".into(), history);
        }
        doc
    }
}

#[derive(Debug, Deserialize)]
pub struct NewsletterSignup {
    #[serde(default)]
    pub email: String,
}

impl NewsletterSignup {
    /// Trimmed address, or an error when it cannot be an email at all.
    pub fn address(&self) -> Result<&str, String> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err("A valid email is required".to_string());
        }
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contact_falls_back_through_aliases() {
        let sub: ContactSubmission = serde_json::from_value(json!({
            "fullName": "Ada",
            "email": "ada@example.com",
            "source": "hero",
            "body": "hello"
        }))
        .unwrap();
        let doc = sub.into_message();
        assert_eq!(doc["name"], json!("Ada"));
        assert_eq!(doc["subject"], json!("hero"));
        assert_eq!(doc["message"], json!("hello"));
        assert_eq!(doc["source"], json!("hero"));
    }

    #[test]
    fn empty_contact_gets_defaults() {
        let doc = ContactSubmission::default().into_message();
        assert_eq!(doc["name"], json!("Anonymous"));
        assert_eq!(doc["email"], json!(""));
        assert_eq!(doc["subject"], json!("Contact Form"));
        assert_eq!(doc["source"], json!("website"));
        assert!(!doc.contains_key("phone"));
    }

    #[test]
    fn lead_requires_name_and_email() {
        let lead = AuraLead {
            name: "Bo".into(),
            ..Default::default()
        };
        assert!(lead.validate().is_err());
    }

    #[test]
    fn lead_becomes_tagged_message() {
        let lead = AuraLead {
            name: "Bo".into(),
            email: "bo@example.com".into(),
            phone: None,
            message: Some("  ".into()),
            chat_history: None,
        };
        assert!(lead.validate().is_ok());
        let doc = lead.into_message();
        assert_eq!(doc["subject"], json!(LEAD_SUBJECT));
        assert_eq!(doc["source"], json!(LEAD_SOURCE));
        assert_eq!(doc["message"], json!(LEAD_DEFAULT_MESSAGE));
        assert_eq!(doc["phone"], json!(""));
        assert!(!doc.contains_key("chatHistory"));
    }

    #[test]
    fn lead_keeps_chat_history() {
        let lead: AuraLead = serde_json::from_value(json!({
            "name": "Bo",
            "email": "bo@example.com",
            "chatHistory": [{"role": "user", "content": "hi"}]
        }))
        .unwrap();
        let doc = lead.into_message();
        assert_eq!(doc["chatHistory"][0]["content"], json!("hi"));
    }

    #[test]
    fn newsletter_address_is_checked() {
        let ok = NewsletterSignup { email: " a@b.co ".into() };
        assert_eq!(ok.address(), Ok("a@b.co"));
        let bad = NewsletterSignup { email: "nope".into() };
        assert!(bad.address().is_err());
    }
}
