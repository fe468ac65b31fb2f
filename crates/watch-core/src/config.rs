use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LABEL: &str = "Watched";
pub const DEFAULT_MAILGUN_API_BASE: &str = "https://api.mailgun.net/v3";
pub const DEFAULT_VOIPMS_API_URL: &str = "https://voip.ms/api/v1/rest.php";

/// Timeout applied to every outbound notification request.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Target URL is not set")]
    MissingUrl,
    #[error("Invalid target URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Poll interval must be a positive number of seconds")]
    ZeroInterval,
    #[error("Request timeout must be a positive number of seconds")]
    ZeroTimeout,
}

/// Configuration for a page watcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Absolute http(s) URL of the page to probe.
    pub url: String,
    /// Fixed delay between the end of one tick and the start of the next (default: 300s).
    pub poll_interval: Duration,
    /// Timeout for a single probe request (default: 10s).
    pub request_timeout: Duration,
    /// Send a "still closed" notification on every tick the page stays 404.
    pub notify_on_404: bool,
    /// Name of the page used in notification wording.
    pub label: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            notify_on_404: false,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl WatchConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_poll_interval(mut self, secs: u64) -> Self {
        self.poll_interval = Duration::from_secs(secs);
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_notify_on_404(mut self, enabled: bool) -> Self {
        self.notify_on_404 = enabled;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        let parsed = url::Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
                reason: "scheme must be http or https".into(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Mailgun email channel settings. The channel is active only when the API key,
/// domain and recipient are all present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailgunConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    /// Sender mailbox. Defaults to `Page Watch Bot <noreply@{domain}>`.
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default = "default_mailgun_api_base")]
    pub api_base: String,
}

fn default_mailgun_api_base() -> String {
    DEFAULT_MAILGUN_API_BASE.to_string()
}

impl Default for MailgunConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            domain: None,
            to: None,
            from: None,
            api_base: default_mailgun_api_base(),
        }
    }
}

impl MailgunConfig {
    /// Names of the required settings that are absent or blank.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.api_key) {
            missing.push("api_key");
        }
        if is_blank(&self.domain) {
            missing.push("domain");
        }
        if is_blank(&self.to) {
            missing.push("to");
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.missing().is_empty()
    }
}

/// VoIP.ms SMS channel settings. All four credentials/numbers are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoipMsConfig {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Originating DID number.
    #[serde(default)]
    pub did: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default = "default_voipms_api_url")]
    pub api_url: String,
}

fn default_voipms_api_url() -> String {
    DEFAULT_VOIPMS_API_URL.to_string()
}

impl Default for VoipMsConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            did: None,
            to: None,
            api_url: default_voipms_api_url(),
        }
    }
}

impl VoipMsConfig {
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.username) {
            missing.push("username");
        }
        if is_blank(&self.password) {
            missing.push("password");
        }
        if is_blank(&self.did) {
            missing.push("did");
        }
        if is_blank(&self.to) {
            missing.push("to");
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.missing().is_empty()
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
