use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 254;
pub const MESSAGE_MAX_CHARS: usize = 500;

pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024;

pub const HEALTH_PATH: &str = "/health";
pub const CONTACT_PATH: &str = "/contact";
