use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::notify::Dispatcher;
use crate::probe::Prober;

use super::notification::Notification;
use super::state::{status_label, Baseline, LoopPhase};
use super::tracker::StateTracker;

/// What happened during one tick.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    Observed {
        status: u16,
        notifications: Vec<Notification>,
    },
    ProbeFailed {
        reason: String,
    },
}

impl TickOutcome {
    pub fn notifications(&self) -> &[Notification] {
        match self {
            Self::Observed { notifications, .. } => notifications,
            Self::ProbeFailed { .. } => &[],
        }
    }
}

/// Poll loop tying the prober, the state tracker and the dispatcher together.
pub struct Watcher {
    config: WatchConfig,
    prober: Arc<dyn Prober>,
    tracker: StateTracker,
    dispatcher: Dispatcher,
    baseline: Baseline,
    phase: LoopPhase,
    ticks: u64,
}

impl Watcher {
    pub fn new(config: WatchConfig, prober: Arc<dyn Prober>, dispatcher: Dispatcher) -> Self {
        let tracker = StateTracker::from_config(&config);
        Self {
            config,
            prober,
            tracker,
            dispatcher,
            baseline: None,
            phase: LoopPhase::Starting,
            ticks: 0,
        }
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    #[cfg(test)]
    fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn enter(&mut self, next: LoopPhase) {
        if self.phase.can_transition_to(next) {
            debug!(from = %self.phase, to = %next, "Loop phase change");
            self.phase = next;
        }
    }

    /// Probe once, update the baseline and dispatch whatever the tracker emits.
    pub async fn tick(&mut self) -> TickOutcome {
        self.enter(LoopPhase::Polling);
        self.ticks += 1;

        let url = self.config.url.as_str();
        let status = match self.prober.probe(url).await {
            Ok(status) => status,
            Err(e) => {
                warn!(
                    url,
                    tick = self.ticks,
                    timed_out = e.is_timeout(),
                    error = %e,
                    "Probe failed, skipping tick"
                );
                self.enter(LoopPhase::Sleeping);
                return TickOutcome::ProbeFailed {
                    reason: e.to_string(),
                };
            }
        };

        info!(url, tick = self.ticks, status, class = status_label(status), "Status code");

        let observation = self.tracker.observe(self.baseline, status);
        self.baseline = observation.baseline;

        for notification in &observation.notifications {
            info!(
                notification_id = %notification.id,
                kind = %notification.kind,
                created_at = %notification.timestamp.to_rfc3339(),
                subject = %notification.subject,
                "Sending notification"
            );
            self.dispatcher.dispatch(notification).await;
        }

        self.enter(LoopPhase::Sleeping);
        TickOutcome::Observed {
            status,
            notifications: observation.notifications,
        }
    }

    /// Tick, then sleep for the poll interval, forever. `shutdown` is only
    /// observed while sleeping, so an in-flight tick always completes.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            url = %self.config.url,
            interval_secs = self.config.poll_interval.as_secs(),
            notify_on_404 = self.config.notify_on_404,
            channels = ?self.dispatcher.channel_names(),
            "Starting watcher"
        );

        tokio::pin!(shutdown);

        loop {
            self.tick().await;

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = &mut shutdown => {
                    info!(ticks = self.ticks, "Watcher stopped");
                    return;
                }
            }
        }
    }
}
