use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::{
    entities::contact::OutboundMessage,
    errors::MailRelayError,
    settings::{AppConfig, Redact},
};

/// Delivers one message per call. Implementations must not retry.
#[async_trait]
pub trait MailRelay: Send + Sync {
    /// Returns the provider-assigned message identifier.
    async fn send(&self, settings: &MailSettings, message: &OutboundMessage) -> Result<String, MailRelayError>;
}

#[async_trait]
impl<T: MailRelay + ?Sized> MailRelay for Arc<T> {
    async fn send(&self, settings: &MailSettings, message: &OutboundMessage) -> Result<String, MailRelayError> {
        (**self).send(settings, message).await
    }
}

#[derive(Clone)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub username: String,
    pub password: Zeroizing<String>,
    pub from: String,
    pub to: String,
    pub timeout: Duration,
}

/// Names of the mail settings that are absent from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMailSettings(pub Vec<&'static str>);

impl fmt::Display for MissingMailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing mail settings: {}", self.0.join(", "))
    }
}

impl MailSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, MissingMailSettings> {
        let mut missing = Vec::new();

        if config.smtp_host.trim().is_empty() {
            missing.push("SMTP_HOST");
        }
        if config.smtp_user.trim().is_empty() {
            missing.push("SMTP_USER");
        }
        if config.smtp_pass.is_empty() {
            missing.push("SMTP_PASS");
        }
        if config.mail_to.trim().is_empty() {
            missing.push("MAIL_TO");
        }

        if !missing.is_empty() {
            return Err(MissingMailSettings(missing));
        }

        Ok(MailSettings {
            host: config.smtp_host.trim().to_string(),
            port: config.smtp_port,
            secure: config.smtp_secure,
            username: config.smtp_user.trim().to_string(),
            password: Zeroizing::new(config.smtp_pass.clone()),
            from: config.sender().to_string(),
            to: config.mail_to.trim().to_string(),
            timeout: config.smtp_timeout(),
        })
    }

    /// Upper bound for connect, verify and send together.
    pub fn exchange_timeout(&self) -> Duration {
        self.timeout * 3
    }
}

impl fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("username", &self.username)
            .field("password", &self.password.as_str().redact())
            .field("from", &self.from)
            .field("to", &self.to)
            .field("timeout", &self.timeout)
            .finish()
    }
}
