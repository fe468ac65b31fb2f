pub mod engine;
pub mod notification;
pub mod state;
pub mod tracker;

pub use engine::{TickOutcome, Watcher};
pub use notification::{Notification, NotificationKind};
pub use state::{Baseline, LoopPhase, PageState};
pub use tracker::{Observation, StateTracker};
