//! Fetching one URL and discarding its body through a speed throttle.

mod curl_fetch;
mod error;

pub use curl_fetch::CurlFetcher;
pub use error::FetchError;

use crate::control::ShutdownToken;
use crate::throttle::SpeedThrottle;

/// What a completed fetch produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Body bytes received and discarded.
    pub bytes: u64,
    /// Final HTTP status (after redirects). Informational only.
    pub status: u32,
}

/// Fetches a URL, feeding every body chunk through `throttle` and dropping it.
///
/// Implementations must return promptly with [`FetchError::Cancelled`] once
/// `shutdown` is cancelled.
pub trait Fetcher: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        throttle: &mut SpeedThrottle,
        shutdown: &ShutdownToken,
    ) -> Result<FetchOutcome, FetchError>;
}
