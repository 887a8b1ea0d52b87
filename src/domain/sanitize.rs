use crate::{
    constants::{EMAIL_MAX_CHARS, MESSAGE_MAX_CHARS, NAME_MAX_CHARS},
    entities::contact::{SanitizedContact, ValidatedContact},
};

impl From<ValidatedContact<'_>> for SanitizedContact {
    fn from(contact: ValidatedContact<'_>) -> Self {
        SanitizedContact {
            name: clean_line(contact.name, NAME_MAX_CHARS),
            email: clean_email(contact.email),
            url: contact.url.to_string(),
            message: contact.message.map(|m| clean_multiline(m, MESSAGE_MAX_CHARS)).unwrap_or_default(),
        }
    }
}

impl SanitizedContact {
    /// Re-applies the normalization. A no-op on values this type produced.
    pub fn resanitized(&self) -> SanitizedContact {
        SanitizedContact {
            name: clean_line(&self.name, NAME_MAX_CHARS),
            email: clean_email(&self.email),
            url: self.url.clone(),
            message: clean_multiline(&self.message, MESSAGE_MAX_CHARS),
        }
    }
}

/// Trims, caps at `max_chars` and trims again so the result is stable.
pub fn clean_text(value: &str, max_chars: usize) -> String {
    truncate_chars(value.trim(), max_chars).trim_end().to_string()
}

/// Single-line field: every control character becomes a space.
pub fn clean_line(value: &str, max_chars: usize) -> String {
    let flattened: String = value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    clean_text(&flattened, max_chars)
}

/// Free text: line breaks normalized to `\n`, other control characters become spaces.
pub fn clean_multiline(value: &str, max_chars: usize) -> String {
    let normalized: String = value
        .replace("\r\n", "\n")
        .chars()
        .map(|c| match c {
            '\r' => '\n',
            '\n' => '\n',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    clean_text(&normalized, max_chars)
}

pub fn clean_email(value: &str) -> String {
    clean_text(&value.to_lowercase(), EMAIL_MAX_CHARS)
}

fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}
