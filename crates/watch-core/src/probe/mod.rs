mod http;

pub use http::HttpProber;

use async_trait::async_trait;
use thiserror::Error;

/// A probe that produced no status code. Network, DNS, TLS and timeout
/// failures all land here; the tick is skipped.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Probe of {url} failed: {reason}")]
    Failed {
        url: String,
        reason: String,
        timed_out: bool,
    },
}

impl ProbeError {
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Failed { timed_out, .. } => *timed_out,
        }
    }
}

/// Trait for checking the HTTP status of a URL.
///
/// Implementations make a single attempt per call and return the status code
/// exactly as received.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> Result<u16, ProbeError>;
}
