use std::net::IpAddr;

use lettre::{message::Mailbox, Address};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::{Host, Url};

use crate::{
    constants::{EMAIL_MAX_CHARS, MESSAGE_MAX_CHARS, NAME_MAX_CHARS, NAME_MIN_CHARS},
    entities::contact::{ContactSubmission, ValidatedContact},
    errors::AppError,
};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

const NAME_ERROR: &str = "Name is required and must be between 2 and 100 characters";
const EMAIL_ERROR: &str = "A valid email address is required";
const URL_ERROR: &str = "A valid public http(s) URL is required";
const MESSAGE_ERROR: &str = "Message must be 500 characters or fewer";

/// Validates fields in order, stopping at the first failure.
pub fn validate_submission(submission: &ContactSubmission) -> Result<ValidatedContact<'_>, AppError> {
    let name = validate_name(submission.name.as_ref())?;
    let email = validate_email(submission.email.as_ref())?;
    let url = validate_url(submission.url.as_ref())?;
    let message = validate_message(submission.message_field())?;

    Ok(ValidatedContact { name, email, url, message })
}

pub fn validate_name(value: Option<&Value>) -> Result<&str, AppError> {
    let invalid = || AppError::Validation { field: "name", message: NAME_ERROR };

    let name = value.and_then(Value::as_str).ok_or_else(invalid)?;
    if name.trim().chars().count() < NAME_MIN_CHARS || name.chars().count() > NAME_MAX_CHARS {
        return Err(invalid());
    }
    Ok(name)
}

pub fn validate_email(value: Option<&Value>) -> Result<&str, AppError> {
    let invalid = || AppError::Validation { field: "email", message: EMAIL_ERROR };

    let email = value.and_then(Value::as_str).ok_or_else(invalid)?;
    if email.chars().count() > EMAIL_MAX_CHARS || !is_email_like(email) || !is_deliverable_address(email) {
        return Err(invalid());
    }
    Ok(email)
}

pub fn validate_url(value: Option<&Value>) -> Result<&str, AppError> {
    let invalid = || AppError::Validation { field: "url", message: URL_ERROR };

    let raw = value.and_then(Value::as_str).ok_or_else(invalid)?;
    if is_public_web_url(raw) {
        Ok(raw)
    } else {
        Err(invalid())
    }
}

pub fn validate_message(value: Option<&Value>) -> Result<Option<&str>, AppError> {
    let invalid = || AppError::Validation { field: "message", message: MESSAGE_ERROR };

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(message)) if message.chars().count() <= MESSAGE_MAX_CHARS => {
            Ok(Some(message.as_str()))
        }
        Some(_) => Err(invalid()),
    }
}

/// Coarse `local@domain.tld` shape check; not RFC 5322.
pub fn is_email_like(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// The relay must be able to encode the address as a bare Reply-To mailbox.
pub fn is_deliverable_address(email: &str) -> bool {
    email.parse::<Address>().is_ok()
        && email.parse::<Mailbox>().is_ok_and(|mailbox| mailbox.name.is_none())
}

/// True for absolute http(s) URLs whose host is not loopback or RFC 1918.
pub fn is_public_web_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        return false;
    };

    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }

    match url.host() {
        Some(Host::Domain(domain)) => !is_local_hostname(domain),
        Some(Host::Ipv4(ip)) => !is_internal_ip(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => !is_internal_ip(IpAddr::V6(ip)),
        None => false,
    }
}

fn is_local_hostname(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    domain == "localhost" || domain.ends_with(".localhost")
}

fn is_internal_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private(),
        IpAddr::V6(v6) => {
            v6.is_loopback() || v6.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback() || v4.is_private())
        }
    }
}
