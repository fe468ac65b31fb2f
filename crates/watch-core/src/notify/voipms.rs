use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{Notifier, NotifyError};
use crate::config::{VoipMsConfig, NOTIFY_TIMEOUT};
use crate::watch::Notification;

/// Sends the notification body as an SMS through the VoIP.ms REST API.
#[derive(Debug, Clone)]
pub struct VoipMsNotifier {
    client: Client,
    config: VoipMsConfig,
}

#[derive(Debug, Deserialize)]
struct SendSmsResponse {
    #[serde(default)]
    status: Option<String>,
}

impl VoipMsNotifier {
    pub fn new(config: VoipMsConfig, client: Client) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Notifier for VoipMsNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let missing = self.config.missing();
        let (Some(username), Some(password), Some(did), Some(dst), true) = (
            self.config.username.as_deref(),
            self.config.password.as_deref(),
            self.config.did.as_deref(),
            self.config.to.as_deref(),
            missing.is_empty(),
        ) else {
            return Err(NotifyError::Unconfigured {
                channel: "sms",
                missing,
            });
        };

        let params = [
            ("api_username", username),
            ("api_password", password),
            ("method", "sendSMS"),
            ("did", did),
            ("dst", dst),
            ("message", notification.body.as_str()),
        ];

        let resp = self
            .client
            .get(&self.config.api_url)
            .query(&params)
            .timeout(NOTIFY_TIMEOUT)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let parsed: SendSmsResponse = serde_json::from_str(&body)
            .map_err(|e| NotifyError::Rejected(format!("unreadable response ({e}): {body}")))?;

        match parsed.status.as_deref() {
            Some("success") => Ok(()),
            _ => Err(NotifyError::Rejected(body)),
        }
    }

    fn channel_name(&self) -> &str {
        "sms"
    }
}
