use serde::Deserialize;
use serde_json::Value;

/// Raw `/contact` body. Fields stay untyped so a wrong JSON type is reported
/// as a field validation error instead of a payload error.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: Option<Value>,

    #[serde(default)]
    pub email: Option<Value>,

    #[serde(default)]
    pub url: Option<Value>,

    #[serde(default)]
    pub message: Option<Value>,

    /// Legacy alias for `message`.
    #[serde(default)]
    pub description: Option<Value>,
}

impl ContactSubmission {
    /// Picks `message`, falling back to `description` when the primary key is
    /// absent, null or an empty string.
    pub fn message_field(&self) -> Option<&Value> {
        match &self.message {
            Some(Value::Null) | None => self.description.as_ref().filter(|v| !v.is_null()),
            Some(Value::String(s)) if s.is_empty() => {
                self.description.as_ref().filter(|v| !v.is_null()).or(self.message.as_ref())
            }
            Some(value) => Some(value),
        }
    }
}

/// A submission whose fields passed validation, borrowed from the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedContact<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub url: &'a str,
    pub message: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedContact {
    pub name: String,
    pub email: String,
    pub url: String,
    pub message: String,
}

/// Request metadata included in the outbound mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionMeta {
    pub client_ip: String,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub body: String,
    pub headers: Vec<(String, String)>,
}
