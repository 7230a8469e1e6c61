//! Single-attempt fetch error type for retry classification.

use thiserror::Error;

/// Error returned by one download attempt. Classified before deciding whether
/// to retry; never escapes a worker (it ends up as a `FailureReason`).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Fewer bytes arrived than the server declared (e.g. server closed early).
    #[error("truncated body: expected {expected} bytes, got {received}")]
    Truncated { expected: u64, received: u64 },
    /// 2xx response with no body.
    #[error("empty response body")]
    EmptyBody,
    /// Disk write, rename or permission failure. Not retried.
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
}
