//! Error types for the query client.
//!
//! Every surfaced error names the external surface and the logical
//! operation, and keeps the underlying cause for diagnostics.

use thiserror::Error;

/// HTTP status codes treated as transient and worth retrying.
///
/// Throttling (429), scrape-blocking (403), unavailability (503), and the
/// gateway-timeout class (408/502/504). Everything else is permanent.
pub const RETRYABLE_STATUS: [u16; 6] = [403, 408, 429, 502, 503, 504];

/// Failures surfaced by [`SearchClient`](crate::SearchClient) operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The remote surface answered with a non-success HTTP status.
    #[error("duckduckgo {operation} failed: HTTP status {status}")]
    Status {
        /// Logical operation that was in flight.
        operation: &'static str,
        /// The status code the surface returned.
        status: u16,
    },

    /// The request failed below the HTTP layer (DNS, connect, timeout, body).
    #[error("duckduckgo {operation} failed: {source}")]
    Transport {
        /// Logical operation that was in flight.
        operation: &'static str,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Every allowed attempt hit a transient failure.
    #[error("duckduckgo {operation} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Logical operation that was in flight.
        operation: &'static str,
        /// How many attempts were made.
        attempts: u32,
        /// The failure observed on the final attempt.
        #[source]
        source: Box<SearchError>,
    },

    /// The HTTP transport could not be constructed.
    #[error("failed to build http transport: {source}")]
    Init {
        /// Underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// The serialized request lane has shut down.
    #[error("request lane is no longer running")]
    LaneClosed,
}

impl SearchError {
    /// Whether this failure is transient enough to retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Status { status, .. } if RETRYABLE_STATUS.contains(status))
    }
}

/// Result type alias using [`SearchError`].
pub type Result<T> = std::result::Result<T, SearchError>;
