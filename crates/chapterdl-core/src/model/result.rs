use std::fmt;

use super::chapter::ChapterId;
use super::job::ImageTask;

/// Why a task ended without a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Every attempt failed (or the error was not retryable).
    NetworkExhausted { attempts: u32, last_error: String },
    /// Local write, rename or permission failure. Never retried.
    Filesystem(String),
    /// A stop was requested before the task was dispatched.
    Cancelled,
    /// The worker running the task exited without producing a result.
    WorkerLost,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NetworkExhausted {
                attempts,
                last_error,
            } => write!(f, "{} after {} attempt(s)", last_error, attempts),
            FailureReason::Filesystem(msg) => write!(f, "filesystem: {}", msg),
            FailureReason::Cancelled => write!(f, "cancelled before download"),
            FailureReason::WorkerLost => write!(f, "worker exited before finishing"),
        }
    }
}

/// Terminal outcome of one image task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success,
    /// A non-empty file was already at the destination; no request was made.
    Skipped,
    Failed(FailureReason),
}

impl DownloadOutcome {
    /// True for outcomes that leave the image on disk.
    pub fn is_ok(&self) -> bool {
        matches!(self, DownloadOutcome::Success | DownloadOutcome::Skipped)
    }
}

/// Write-once result produced by the worker that ran the task.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub task: ImageTask,
    pub outcome: DownloadOutcome,
    pub bytes_written: u64,
    pub attempts: u32,
}

impl DownloadResult {
    pub fn success(task: ImageTask, bytes_written: u64, attempts: u32) -> Self {
        Self {
            task,
            outcome: DownloadOutcome::Success,
            bytes_written,
            attempts,
        }
    }

    pub fn skipped(task: ImageTask) -> Self {
        Self {
            task,
            outcome: DownloadOutcome::Skipped,
            bytes_written: 0,
            attempts: 0,
        }
    }

    pub fn failed(task: ImageTask, reason: FailureReason, attempts: u32) -> Self {
        Self {
            task,
            outcome: DownloadOutcome::Failed(reason),
            bytes_written: 0,
            attempts,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match &self.outcome {
            DownloadOutcome::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Progress of the chapter currently downloading. Rebuilt after every finished task.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub chapter: ChapterId,
    /// Tasks with a terminal result (success, skip or failure).
    pub completed: usize,
    pub total: usize,
    /// How many of the completed tasks failed.
    pub failed: usize,
}

impl ProgressSnapshot {
    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.completed as f64 / self.total as f64).min(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }
}
