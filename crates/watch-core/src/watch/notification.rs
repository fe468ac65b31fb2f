use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Opened,
    Closed,
    StillClosed,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opened => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
            Self::StillClosed => write!(f, "STILL-CLOSED"),
        }
    }
}

/// A message produced by the state tracker, delivered once and discarded.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: NotificationKind,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind,
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn opened(label: &str, status: u16) -> Self {
        Self::new(
            NotificationKind::Opened,
            format!("{label} Sign-ups Open?"),
            format!("The {label} page is now returning {status}. Sign-ups might be open!"),
        )
    }

    pub fn closed(label: &str) -> Self {
        Self::new(
            NotificationKind::Closed,
            format!("{label} Sign-ups Closed?"),
            format!("The {label} page went back to 404. Sign-ups might have closed."),
        )
    }

    pub fn still_closed(label: &str) -> Self {
        Self::new(
            NotificationKind::StillClosed,
            format!("{label} Still Closed"),
            format!("Still 404 - {label} sign-ups not open yet."),
        )
    }
}
