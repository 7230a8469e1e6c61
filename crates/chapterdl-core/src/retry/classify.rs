//! Classify HTTP status and curl errors into retry policy error kinds.

use super::error::FetchError;
use super::policy::ErrorKind;

/// Classify a non-2xx HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        _ => ErrorKind::HttpStatus(code.min(u16::MAX as u32) as u16),
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_partial_file() {
        return ErrorKind::Truncated;
    }
    if e.is_url_malformed() || e.is_unsupported_protocol() {
        return ErrorKind::Other;
    }
    ErrorKind::Connection
}

/// Classify a fetch error (curl, HTTP, truncation or storage) into an ErrorKind.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Curl(ce) => classify_curl_error(ce),
        FetchError::Http(code) => classify_http_status(*code),
        FetchError::Truncated { .. } | FetchError::EmptyBody => ErrorKind::Truncated,
        FetchError::Storage(_) => ErrorKind::Storage,
    }
}
