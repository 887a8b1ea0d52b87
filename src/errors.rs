use std::fmt;
use std::time::Duration;

use actix_web::{
    error::ResponseError,
    http::{header::{self, ContentType}, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitScope {
    Global,
    Contact,
}

impl RateLimitScope {
    pub fn client_message(&self) -> &'static str {
        match self {
            RateLimitScope::Global => "Too many requests from this IP, please try again later.",
            RateLimitScope::Contact => "Too many contact submissions from this IP, please try again in an hour.",
        }
    }
}

impl fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitScope::Global => write!(f, "global"),
            RateLimitScope::Contact => write!(f, "contact"),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Validation { field: &'static str, message: &'static str },
    OriginRejected(String),
    RateLimited { scope: RateLimitScope, retry_after: Option<Duration> },
    Configuration(String),
    MailRelay(String),
    NotFound,
    PayloadTooLarge,
    BadRequest(String),
    /// Detail is `None` once redacted for production responses.
    Internal(Option<String>),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation { field, message } => write!(f, "validation error: {}: {}", field, message),
            AppError::OriginRejected(origin) => write!(f, "Origin rejected: {}", origin),
            AppError::RateLimited { scope, .. } => write!(f, "Rate limited ({})", scope),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::MailRelay(msg) => write!(f, "Mail relay error: {}", msg),
            AppError::NotFound => write!(f, "Endpoint not found"),
            AppError::PayloadTooLarge => write!(f, "Payload too large"),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(Some(msg)) => write!(f, "Internal server error: {}", msg),
            AppError::Internal(None) => write!(f, "Internal server error"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation { field, message } => {
                serde_json::json!({
                    "error": message,
                    "field": field
                })
            }
            AppError::OriginRejected(_) => serde_json::json!({"error": "Not allowed by CORS"}),
            AppError::RateLimited { scope, .. } => serde_json::json!({"error": scope.client_message()}),
            AppError::Configuration(_) => serde_json::json!({"error": "Email service is not configured"}),
            AppError::MailRelay(_) => {
                serde_json::json!({"error": "Unable to send message. Please try again later."})
            }
            AppError::NotFound => serde_json::json!({"error": "Endpoint not found"}),
            AppError::PayloadTooLarge => serde_json::json!({"error": "Payload too large"}),
            AppError::BadRequest(_) => serde_json::json!({"error": "Invalid JSON payload"}),
            AppError::Internal(Some(details)) => {
                serde_json::json!({
                    "error": "Internal server error",
                    "details": details
                })
            }
            AppError::Internal(None) => serde_json::json!({"error": "Internal server error"}),
        };

        let mut response = HttpResponse::build(self.status_code());
        response.insert_header(ContentType::json());

        if let AppError::RateLimited { retry_after: Some(wait), .. } = self {
            response.insert_header((header::RETRY_AFTER, wait.as_secs().max(1).to_string()));
        }

        response.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::OriginRejected(_) => StatusCode::FORBIDDEN,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MailRelay(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AppError {
    /// Strips internal detail before the error leaves the process.
    pub fn for_client(self, expose_details: bool) -> Self {
        match self {
            AppError::Internal(_) if !expose_details => AppError::Internal(None),
            other => other,
        }
    }
}

impl From<MailRelayError> for AppError {
    fn from(err: MailRelayError) -> Self {
        match err {
            MailRelayError::InvalidAddress(..) | MailRelayError::MessageBuild(_) => {
                AppError::Internal(Some(err.to_string()))
            }
            _ => AppError::MailRelay(err.to_string()),
        }
    }
}

#[derive(Debug, Display)]
pub enum MailRelayError {
    #[display("Invalid mail address {_0}: {_1}")]
    InvalidAddress(&'static str, String),

    #[display("Failed to build message: {_0}")]
    MessageBuild(String),

    #[display("Failed to configure transport: {_0}")]
    Transport(String),

    #[display("SMTP server unreachable: {_0}")]
    Unreachable(String),

    #[display("SMTP send failed: {_0}")]
    Send(String),

    #[display("SMTP exchange timed out after {_0:?}")]
    TimedOut(Duration),
}

impl std::error::Error for MailRelayError {}
