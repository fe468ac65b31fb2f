/// Classification of a probe result for transition purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    NotFound,
    Available,
}

impl PageState {
    pub fn classify(status: u16) -> Self {
        if status == 404 {
            Self::NotFound
        } else {
            Self::Available
        }
    }

    pub fn is_404(self) -> bool {
        self == Self::NotFound
    }
}

impl std::fmt::Display for PageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "404"),
            Self::Available => write!(f, "not-404"),
        }
    }
}

/// Last confirmed classification. `None` until the first successful probe.
pub type Baseline = Option<PageState>;

/// Short label for log lines: `404`, `200` or `other`.
pub fn status_label(status: u16) -> &'static str {
    match status {
        404 => "404",
        200 => "200",
        _ => "other",
    }
}

/// Phases of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Starting,
    Polling,
    Sleeping,
}

impl LoopPhase {
    pub fn can_transition_to(self, target: LoopPhase) -> bool {
        matches!(
            (self, target),
            (LoopPhase::Starting, LoopPhase::Polling)
                | (LoopPhase::Polling, LoopPhase::Sleeping)
                | (LoopPhase::Sleeping, LoopPhase::Polling)
        )
    }
}

impl std::fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Starting => write!(f, "starting"),
            Self::Polling => write!(f, "polling"),
            Self::Sleeping => write!(f, "sleeping"),
        }
    }
}
