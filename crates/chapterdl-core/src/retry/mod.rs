//! Retry and backoff policy.
//!
//! Error classification (timeouts, throttling, connection failures, truncated
//! bodies) and exponential backoff decisions shared by the fetcher.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, Attempted};
