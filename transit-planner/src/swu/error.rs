//! SWU client error types.

use crate::domain::StopId;

use super::types::Passage;

/// Errors from the SWU HTTP client.
///
/// Everything past client construction names the stop and the passage
/// endpoint it was querying.
#[derive(Debug, thiserror::Error)]
pub enum SwuError {
    /// The HTTP client could not be built
    #[error("failed to build SWU HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request failed (connection, timeout, reading the body)
    #[error("{passage} request for stop {stop} failed: {source}")]
    Request {
        passage: Passage,
        stop: StopId,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status other than rate limiting
    #[error("{passage} for stop {stop} returned HTTP {status}: {body}")]
    Status {
        passage: Passage,
        stop: StopId,
        status: u16,
        body: String,
    },

    /// HTTP 429
    #[error("rate limited by SWU API ({passage} for stop {stop})")]
    RateLimited { passage: Passage, stop: StopId },

    /// Body was not a passage document; `body` is truncated
    #[error("invalid {passage} response for stop {stop}: {message} (body: {body})")]
    Decode {
        passage: Passage,
        stop: StopId,
        message: String,
        body: String,
    },

    /// The request limiter was shut down
    #[error("request limiter closed")]
    LimiterClosed,
}

impl SwuError {
    /// The stop the failed request was for, if it got that far.
    pub fn stop(&self) -> Option<StopId> {
        match self {
            SwuError::Request { stop, .. }
            | SwuError::Status { stop, .. }
            | SwuError::RateLimited { stop, .. }
            | SwuError::Decode { stop, .. } => Some(*stop),
            SwuError::Client(_) | SwuError::LimiterClosed => None,
        }
    }
}
