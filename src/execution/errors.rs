//! Failure modes of the exchange client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Transport-level failure before any exchange response arrived.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The exchange answered with a non-success status. The raw body is
    /// preserved so callers see the exchange's own error code and message.
    #[error("exchange rejected the request (status {status}): {body}")]
    UpstreamRejected { status: u16, body: String },

    /// The symbol is unknown or carries neither a NOTIONAL nor a legacy
    /// MIN_NOTIONAL filter.
    #[error("no NOTIONAL or MIN_NOTIONAL filter found for symbol {0}")]
    FilterNotFound(String),

    /// The exchange answered 2xx but the body did not match the expected
    /// shape.
    #[error("failed to decode exchange response: {0}")]
    Decode(#[from] serde_json::Error),
}
