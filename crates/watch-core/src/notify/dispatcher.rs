use std::time::Instant;

use tracing::{debug, info, warn};

use super::Notifier;
use crate::watch::Notification;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    /// The channel lacks required settings and did nothing.
    Skipped,
    Failed(String),
}

/// Result of dispatching a notification to a single channel.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub channel: String,
    pub outcome: DispatchOutcome,
    pub duration_ms: u64,
}

/// Sends each notification to every channel, one after another.
///
/// A failing or unconfigured channel is logged and never stops the channels
/// after it.
pub struct Dispatcher {
    channels: Vec<Box<dyn Notifier>>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.channel_name()).collect()
    }

    pub async fn dispatch(&self, notification: &Notification) -> Vec<DispatchResult> {
        if self.channels.is_empty() {
            debug!(notification_id = %notification.id, "No notification channels registered");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            let start = Instant::now();
            let result = channel.send(notification).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let outcome = match result {
                Ok(()) => {
                    info!(
                        notification_id = %notification.id,
                        channel = channel.channel_name(),
                        subject = %notification.subject,
                        duration_ms,
                        "Notification delivered"
                    );
                    DispatchOutcome::Delivered
                }
                Err(e) if e.is_unconfigured() => {
                    info!(
                        notification_id = %notification.id,
                        channel = channel.channel_name(),
                        reason = %e,
                        "Notification channel skipped"
                    );
                    DispatchOutcome::Skipped
                }
                Err(e) => {
                    warn!(
                        notification_id = %notification.id,
                        channel = channel.channel_name(),
                        error = %e,
                        duration_ms,
                        "Notification delivery failed"
                    );
                    DispatchOutcome::Failed(e.to_string())
                }
            };

            results.push(DispatchResult {
                channel: channel.channel_name().to_string(),
                outcome,
                duration_ms,
            });
        }

        results
    }
}
