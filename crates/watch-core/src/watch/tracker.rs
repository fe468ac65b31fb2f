use tracing::info;

use super::notification::Notification;
use super::state::{Baseline, PageState};

/// Result of feeding one status code through the tracker.
#[derive(Debug, Clone)]
pub struct Observation {
    pub baseline: Baseline,
    pub notifications: Vec<Notification>,
}

/// Decides which notifications a new observation triggers.
///
/// The tracker holds no mutable state: the caller owns the baseline and
/// passes it in on every tick.
#[derive(Debug, Clone)]
pub struct StateTracker {
    label: String,
    notify_on_404: bool,
}

impl StateTracker {
    pub fn new(label: impl Into<String>, notify_on_404: bool) -> Self {
        Self {
            label: label.into(),
            notify_on_404,
        }
    }

    pub fn from_config(config: &crate::config::WatchConfig) -> Self {
        Self::new(config.label.clone(), config.notify_on_404)
    }

    pub fn observe(&self, baseline: Baseline, status: u16) -> Observation {
        let current = PageState::classify(status);

        // First observation becomes the baseline without notifying.
        let Some(prior) = baseline else {
            info!(status, baseline = %current, "Baseline established");
            return Observation {
                baseline: Some(current),
                notifications: Vec::new(),
            };
        };

        let mut notifications = Vec::new();
        let mut next = prior;

        match prior {
            // Only an exact 200 ends a 404 streak; other codes leave the
            // baseline at 404.
            PageState::NotFound if status == 200 => {
                info!(status, "Page changed from 404 to 200");
                notifications.push(Notification::opened(&self.label, status));
                next = PageState::Available;
            }
            PageState::Available if current.is_404() => {
                info!(status, "Page went back to 404");
                notifications.push(Notification::closed(&self.label));
                next = PageState::NotFound;
            }
            _ => {}
        }

        if current.is_404() && self.notify_on_404 {
            notifications.push(Notification::still_closed(&self.label));
        }

        Observation {
            baseline: Some(next),
            notifications,
        }
    }
}
