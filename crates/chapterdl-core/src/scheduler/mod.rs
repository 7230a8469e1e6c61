//! Per-chapter download scheduler.
//!
//! Fans a chapter's image tasks out over a fixed pool of worker threads that
//! share one `Fetch` implementation (and through it one rate limiter), collects
//! every task's terminal result, and reports progress after each one.

mod observer;
mod pool;
mod report;

pub use observer::{NoopObserver, ProgressObserver};
pub use report::ChapterReport;

use std::sync::Arc;

use crate::control::StopToken;
use crate::fetch::Fetch;
use crate::model::{ChapterJob, DownloadResult, FailureReason, JobCompletion, ProgressSnapshot};

/// Default number of concurrent downloads per chapter.
pub const DEFAULT_WORKERS: usize = 3;

pub struct DownloadScheduler {
    fetcher: Arc<dyn Fetch>,
    workers: usize,
    stop: StopToken,
}

impl DownloadScheduler {
    pub fn new(fetcher: Arc<dyn Fetch>, workers: usize, stop: StopToken) -> Self {
        Self {
            fetcher,
            workers: workers.max(1),
            stop,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn stop_token(&self) -> &StopToken {
        &self.stop
    }

    /// Downloads every task of `job` and blocks until each has a terminal result.
    ///
    /// A failed task never cancels its siblings. The job's completion is set to
    /// `Complete` only when every result is Success or Skipped. Results come back
    /// in sequence order regardless of completion order.
    pub fn run(&self, job: &mut ChapterJob, observer: &dyn ProgressObserver) -> ChapterReport {
        let chapter = job.chapter().clone();
        let total = job.len();
        tracing::info!(chapter = %chapter, images = total, workers = self.workers, "downloading chapter");

        let results = match std::fs::create_dir_all(job.folder()) {
            Ok(()) => pool::run_pool(
                job.tasks(),
                self.fetcher.as_ref(),
                self.workers,
                &self.stop,
                |snapshot_counts| {
                    observer.on_progress(&ProgressSnapshot {
                        chapter: chapter.clone(),
                        completed: snapshot_counts.completed,
                        total,
                        failed: snapshot_counts.failed,
                    })
                },
            ),
            Err(e) => {
                tracing::warn!(chapter = %chapter, "could not create {}: {}", job.folder().display(), e);
                let reason = FailureReason::Filesystem(format!(
                    "create {}: {}",
                    job.folder().display(),
                    e
                ));
                let results: Vec<DownloadResult> = job
                    .tasks()
                    .iter()
                    .map(|t| DownloadResult::failed(t.clone(), reason.clone(), 0))
                    .collect();
                observer.on_progress(&ProgressSnapshot {
                    chapter: chapter.clone(),
                    completed: total,
                    total,
                    failed: total,
                });
                results
            }
        };

        let report = ChapterReport::new(chapter, results);
        let failed = report.failed().count();
        job.set_completion(if failed == 0 {
            JobCompletion::Complete
        } else {
            JobCompletion::PartiallyFailed { failed }
        });
        tracing::info!(
            chapter = %report.chapter(),
            succeeded = report.succeeded(),
            skipped = report.skipped(),
            failed,
            "chapter download finished"
        );
        report
    }
}
