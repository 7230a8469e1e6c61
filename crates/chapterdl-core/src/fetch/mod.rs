//! One URL → one file, with rate limiting and bounded retries.
//!
//! Each attempt waits on the shared `RateLimiter`, streams the body into
//! `<destination>.part` and renames it into place only after the transfer is
//! complete. A destination that already holds a non-empty file is reported as
//! `Skipped` without touching the network.

mod attempt;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::model::{DownloadResult, FailureReason, ImageTask};
use crate::rate_limit::RateLimiter;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use crate::storage;

/// Something that turns an `ImageTask` into a terminal `DownloadResult`.
/// Implemented by `Fetcher`; the scheduler only depends on this trait.
pub trait Fetch: Send + Sync {
    fn fetch(&self, task: &ImageTask) -> DownloadResult;
}

/// libcurl settings applied to every attempt.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub user_agent: Option<String>,
    pub connect_timeout: Duration,
    /// Abort if throughput stays below 1 KiB/s for this long.
    pub low_speed_time: Duration,
    /// Hard wall-clock limit for a single attempt.
    pub timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            connect_timeout: Duration::from_secs(30),
            low_speed_time: Duration::from_secs(60),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Rate-limited, retrying HTTP GET into a local file.
pub struct Fetcher {
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
    http: HttpOptions,
}

impl Fetcher {
    pub fn new(limiter: Arc<RateLimiter>, policy: RetryPolicy, http: HttpOptions) -> Self {
        Self {
            limiter,
            policy,
            http,
        }
    }

    /// Downloads `url` to `destination`.
    ///
    /// At most `policy.max_attempts` requests are issued. On failure nothing is
    /// left under `destination`, and a pre-existing file there is never touched
    /// because that case returns `Skipped` up front.
    pub fn fetch_to(&self, task: &ImageTask) -> DownloadResult {
        let destination = task.destination.as_path();
        if storage::is_complete_file(destination) {
            tracing::debug!(index = task.sequence_index, "already on disk: {}", destination.display());
            return DownloadResult::skipped(task.clone());
        }

        let temp = storage::temp_path(destination);
        let out = run_with_retry(&self.policy, |attempt| {
            self.limiter.acquire();
            tracing::debug!(index = task.sequence_index, attempt, "GET {}", task.source_url);
            attempt::get_to_file(&task.source_url, &temp, destination, &self.http)
        });

        match out.result {
            Ok(bytes) => {
                tracing::debug!(
                    index = task.sequence_index,
                    bytes,
                    attempts = out.attempts,
                    "saved {}",
                    destination.display()
                );
                DownloadResult::success(task.clone(), bytes, out.attempts)
            }
            Err(e) => {
                remove_leftover(&temp);
                tracing::warn!(
                    index = task.sequence_index,
                    attempts = out.attempts,
                    "giving up on {}: {}",
                    task.source_url,
                    e
                );
                DownloadResult::failed(task.clone(), failure_reason(e, out.attempts), out.attempts)
            }
        }
    }
}

impl Fetch for Fetcher {
    fn fetch(&self, task: &ImageTask) -> DownloadResult {
        self.fetch_to(task)
    }
}

fn failure_reason(e: FetchError, attempts: u32) -> FailureReason {
    match e {
        FetchError::Storage(io) => FailureReason::Filesystem(io.to_string()),
        other => FailureReason::NetworkExhausted {
            attempts,
            last_error: other.to_string(),
        },
    }
}

fn remove_leftover(temp: &Path) {
    if temp.exists() {
        if let Err(e) = std::fs::remove_file(temp) {
            tracing::warn!("could not remove {}: {}", temp.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChapterId, DownloadOutcome};

    #[test]
    fn existing_file_is_skipped_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("0001.jpg");
        std::fs::write(&dest, b"already here").unwrap();
        let task = ImageTask {
            chapter: ChapterId::new("Chapter 1"),
            sequence_index: 1,
            // Nothing listens here; a request would fail.
            source_url: "http://127.0.0.1:9/0001.jpg".to_string(),
            destination: dest.clone(),
        };
        let fetcher = Fetcher::new(
            Arc::new(RateLimiter::unlimited()),
            RetryPolicy::default(),
            HttpOptions::default(),
        );
        let res = fetcher.fetch(&task);
        assert_eq!(res.outcome, DownloadOutcome::Skipped);
        assert_eq!(res.attempts, 0);
        assert_eq!(std::fs::read(&dest).unwrap(), b"already here");
    }

    #[test]
    fn unwritable_folder_fails_as_filesystem_error_without_retry() {
        let dir = tempfile::tempdir().unwrap();
        let task = ImageTask {
            chapter: ChapterId::new("Chapter 1"),
            sequence_index: 1,
            source_url: "http://127.0.0.1:9/0001.jpg".to_string(),
            destination: dir.path().join("missing-dir").join("0001.jpg"),
        };
        let fetcher = Fetcher::new(
            Arc::new(RateLimiter::unlimited()),
            RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(1),
            },
            HttpOptions::default(),
        );
        let res = fetcher.fetch(&task);
        assert!(matches!(res.failure(), Some(FailureReason::Filesystem(_))));
        assert_eq!(res.attempts, 1);
    }
}
