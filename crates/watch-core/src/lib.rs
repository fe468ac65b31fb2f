#![forbid(unsafe_code)]

pub mod config;
pub mod notify;
pub mod probe;
pub mod watch;

pub use config::{ConfigError, MailgunConfig, VoipMsConfig, WatchConfig};
pub use notify::{
    DispatchOutcome, DispatchResult, Dispatcher, MailgunNotifier, Notifier, NotifyError,
    VoipMsNotifier,
};
pub use probe::{HttpProber, ProbeError, Prober};
pub use watch::{
    Baseline, LoopPhase, Notification, NotificationKind, Observation, PageState, StateTracker,
    TickOutcome, Watcher,
};
