use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};
use url::Url;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_secure: bool,

    #[serde(default)]
    pub smtp_user: String,

    #[serde(default)]
    pub smtp_pass: String,

    #[serde(default = "default_smtp_timeout")]
    pub smtp_timeout_secs: u64,

    #[serde(default)]
    pub mail_from: String,

    #[serde(default)]
    pub mail_to: String,

    /// Comma-separated list of exact origins.
    #[serde(default)]
    pub allowed_origins: String,

    #[serde(default)]
    pub trust_forwarded_for: bool,

    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    #[serde(default = "default_global_window")]
    pub global_rate_window_secs: u64,

    #[serde(default = "default_global_max")]
    pub global_rate_max: u64,

    #[serde(default = "default_contact_window")]
    pub contact_rate_window_secs: u64,

    #[serde(default = "default_contact_max")]
    pub contact_rate_max: u64,

    #[serde(default = "default_sweep_interval")]
    pub limiter_sweep_secs: u64,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Contact-Relay".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_smtp_timeout() -> u64 {
    5
}
fn default_body_limit() -> usize {
    crate::constants::DEFAULT_BODY_LIMIT_BYTES
}
fn default_global_window() -> u64 {
    15 * 60
}
fn default_global_max() -> u64 {
    5
}
fn default_contact_window() -> u64 {
    60 * 60
}
fn default_contact_max() -> u64 {
    3
}
fn default_sweep_interval() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_secure: false,
            smtp_user: String::new(),
            smtp_pass: String::new(),
            smtp_timeout_secs: default_smtp_timeout(),
            mail_from: String::new(),
            mail_to: String::new(),
            allowed_origins: String::new(),
            trust_forwarded_for: false,
            body_limit_bytes: default_body_limit(),
            global_rate_window_secs: default_global_window(),
            global_rate_max: default_global_max(),
            contact_rate_window_secs: default_contact_window(),
            contact_rate_max: default_contact_max(),
            limiter_sweep_secs: default_sweep_interval(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        // No key separator: APP_SMTP_HOST maps to `smtp_host`, not `smtp.host`
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(Environment::with_prefix("APP").try_parsing(true).ignore_empty(true));

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.is_production() && self.port == 0 {
            errors.push("PORT must be set in production");
        }
        if self.worker_count == 0 {
            errors.push("WORKER_COUNT must be greater than zero");
        }
        if self.global_rate_window_secs == 0 || self.contact_rate_window_secs == 0 {
            errors.push("Rate limit windows must be greater than zero");
        }
        if self.global_rate_max == 0 || self.contact_rate_max == 0 {
            errors.push("Rate limit maxima must be greater than zero");
        }
        if self.smtp_timeout_secs == 0 {
            errors.push("SMTP_TIMEOUT_SECS must be greater than zero");
        }
        if self.body_limit_bytes == 0 {
            errors.push("BODY_LIMIT_BYTES must be greater than zero");
        }
        if self.limiter_sweep_secs == 0 {
            errors.push("LIMITER_SWEEP_SECS must be greater than zero");
        }
        let origins = self.allowed_origins();
        if origins.iter().any(|o| o == "*") {
            errors.push("Wildcard origin (*) is not allowed, list origins explicitly");
        } else if origins.iter().any(|o| !is_valid_origin(o)) {
            errors.push("ALLOWED_ORIGINS entries must be absolute origins like https://example.com");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Sender address, falling back to the SMTP username.
    pub fn sender(&self) -> &str {
        if self.mail_from.trim().is_empty() {
            self.smtp_user.trim()
        } else {
            self.mail_from.trim()
        }
    }

    pub fn smtp_timeout(&self) -> Duration {
        Duration::from_secs(self.smtp_timeout_secs)
    }
}

/// `scheme://host[:port]` with nothing after the authority.
fn is_valid_origin(origin: &str) -> bool {
    match Url::parse(origin) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some()
                && url.path() == "/"
                && url.query().is_none()
                && url.fragment().is_none()
                && url.username().is_empty()
                && url.password().is_none()
        }
        Err(_) => false,
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

pub(crate) trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_secure", &self.smtp_secure)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &self.smtp_pass.redact())
            .field("smtp_timeout_secs", &self.smtp_timeout_secs)
            .field("mail_from", &self.mail_from)
            .field("mail_to", &self.mail_to)
            .field("allowed_origins", &self.allowed_origins())
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .field("body_limit_bytes", &self.body_limit_bytes)
            .field("global_rate_window_secs", &self.global_rate_window_secs)
            .field("global_rate_max", &self.global_rate_max)
            .field("contact_rate_window_secs", &self.contact_rate_window_secs)
            .field("contact_rate_max", &self.contact_rate_max)
            .field("limiter_sweep_secs", &self.limiter_sweep_secs)
            .finish()
    }
}
