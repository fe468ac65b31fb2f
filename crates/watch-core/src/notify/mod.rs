//! Notification channels.
//!
//! A [`Notifier`] delivers a [`Notification`] through one external service.
//! The [`Dispatcher`] runs every configured channel in order and isolates
//! their failures from each other.

mod dispatcher;
mod mailgun;
mod voipms;

pub use dispatcher::{DispatchOutcome, DispatchResult, Dispatcher};
pub use mailgun::MailgunNotifier;
pub use voipms::VoipMsNotifier;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::config::NOTIFY_TIMEOUT;
use crate::watch::Notification;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{channel} channel not configured (missing {})", .missing.join(", "))]
    Unconfigured {
        channel: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from provider: {body}")]
    Status { status: u16, body: String },

    #[error("Provider rejected message: {0}")]
    Rejected(String),
}

impl NotifyError {
    pub fn is_unconfigured(&self) -> bool {
        matches!(self, Self::Unconfigured { .. })
    }
}

/// Trait for notification channel implementations.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification through this channel.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g. "email", "sms").
    fn channel_name(&self) -> &str;
}

/// Shared client for outbound notification requests, bounded by [`NOTIFY_TIMEOUT`].
pub fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(NOTIFY_TIMEOUT)
        .user_agent(concat!("page-watch/", env!("CARGO_PKG_VERSION")))
        .build()
}
