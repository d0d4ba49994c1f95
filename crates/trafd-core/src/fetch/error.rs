//! Fetch error type, split by where the transfer stopped.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Failed before any body byte arrived (DNS, connect, timeout, bad URL).
    #[error("request failed: {0}")]
    Request(#[source] curl::Error),
    /// Body stream broke off after `received` bytes.
    #[error("interrupted after {received} bytes: {source}")]
    Interrupted {
        received: u64,
        #[source]
        source: curl::Error,
    },
    /// Shutdown was requested while the transfer was running.
    #[error("cancelled by shutdown")]
    Cancelled,
}
