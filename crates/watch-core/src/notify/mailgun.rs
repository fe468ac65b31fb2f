use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::{Notifier, NotifyError};
use crate::config::{MailgunConfig, NOTIFY_TIMEOUT};
use crate::watch::Notification;

/// Sends notifications as plain-text email through the Mailgun messages API.
#[derive(Debug, Clone)]
pub struct MailgunNotifier {
    client: Client,
    config: MailgunConfig,
}

impl MailgunNotifier {
    pub fn new(config: MailgunConfig, client: Client) -> Self {
        Self { client, config }
    }

    fn sender(&self, domain: &str) -> String {
        match self.config.from.as_deref() {
            Some(from) if !from.trim().is_empty() => from.to_string(),
            _ => format!("Page Watch Bot <noreply@{domain}>"),
        }
    }
}

#[async_trait]
impl Notifier for MailgunNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let missing = self.config.missing();
        let (Some(api_key), Some(domain), Some(to), true) = (
            self.config.api_key.as_deref(),
            self.config.domain.as_deref(),
            self.config.to.as_deref(),
            missing.is_empty(),
        ) else {
            return Err(NotifyError::Unconfigured {
                channel: "email",
                missing,
            });
        };

        let url = format!(
            "{}/{}/messages",
            self.config.api_base.trim_end_matches('/'),
            domain
        );
        let from = self.sender(domain);
        let form = [
            ("from", from.as_str()),
            ("to", to),
            ("subject", notification.subject.as_str()),
            ("text", notification.body.as_str()),
        ];

        let resp = self
            .client
            .post(&url)
            .basic_auth("api", Some(api_key))
            .form(&form)
            .timeout(NOTIFY_TIMEOUT)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(NotifyError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn channel_name(&self) -> &str {
        "email"
    }
}
