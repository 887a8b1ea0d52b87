use std::{sync::Arc, time::Duration};

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases, validation, sanitize};
pub use interfaces::{handlers, middlewares, routes};
pub use infrastructure::{limiter, mail, utils};

use errors::AppError;
use limiter::rate_limiter::FixedWindowLimiterStore;
use mail::{relay::{MailRelay, MailSettings}, smtp::SmtpRelay};
use use_cases::contact::ContactHandler;

pub struct AppState {
    pub contact_handler: AppContactHandler,
    pub global_limiter: FixedWindowLimiterStore,
    pub contact_limiter: FixedWindowLimiterStore,
    pub allowed_origins: Vec<String>,
    pub trust_forwarded_for: bool,
    pub expose_error_details: bool,
    pub body_limit: usize,
}

pub type AppContactHandler = ContactHandler<Arc<dyn MailRelay>>;

impl AppState {
    pub fn new(config: &settings::AppConfig) -> Self {
        Self::with_relay(config, Arc::new(SmtpRelay::new()))
    }

    pub fn with_relay(config: &settings::AppConfig, relay: Arc<dyn MailRelay>) -> Self {
        let mail_settings = MailSettings::from_config(config);
        if let Err(missing) = &mail_settings {
            tracing::warn!("Contact submissions will be refused: {}", missing);
        }

        AppState {
            contact_handler: ContactHandler::new(relay, mail_settings),
            global_limiter: FixedWindowLimiterStore::new(
                Duration::from_secs(config.global_rate_window_secs),
                config.global_rate_max,
            ),
            contact_limiter: FixedWindowLimiterStore::new(
                Duration::from_secs(config.contact_rate_window_secs),
                config.contact_rate_max,
            ),
            allowed_origins: config.allowed_origins(),
            trust_forwarded_for: config.trust_forwarded_for,
            expose_error_details: !config.is_production(),
            body_limit: config.body_limit_bytes,
        }
    }

    /// Last stop before an error is rendered: logs unexpected failures and
    /// hides their detail in production.
    pub fn client_error(&self, err: AppError) -> AppError {
        if let AppError::Internal(detail) = &err {
            tracing::error!(detail = ?detail, "Unhandled error while processing request");
        }
        err.for_client(self.expose_error_details)
    }
}
