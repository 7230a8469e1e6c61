//! Bounded worker pool over a shared task queue.

use std::collections::VecDeque;
use std::sync::{mpsc, Mutex};

use crate::control::StopToken;
use crate::fetch::Fetch;
use crate::model::{DownloadResult, FailureReason, ImageTask};

/// Running totals handed to the progress callback.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct Counts {
    pub completed: usize,
    pub failed: usize,
}

/// Runs `tasks` on up to `max_workers` threads. Workers pull the next task
/// index from a shared queue and stop pulling once `stop` is set; results are
/// collected on the calling thread, which is the only writer of the counters.
///
/// Returns one result per task, in task order. Tasks that were never
/// dispatched end `Failed(Cancelled)` and are reported in one final progress
/// update.
pub(super) fn run_pool<P>(
    tasks: &[ImageTask],
    fetcher: &dyn Fetch,
    max_workers: usize,
    stop: &StopToken,
    mut on_progress: P,
) -> Vec<DownloadResult>
where
    P: FnMut(Counts),
{
    let count = tasks.len();
    let mut slots: Vec<Option<DownloadResult>> = vec![None; count];
    if count == 0 {
        return Vec::new();
    }

    let work: Mutex<VecDeque<usize>> = Mutex::new((0..count).collect());
    let num_workers = max_workers.max(1).min(count);
    let mut counts = Counts::default();

    std::thread::scope(|scope| {
        let (tx, rx) = mpsc::channel::<(usize, DownloadResult)>();
        let mut handles = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let tx = tx.clone();
            let work = &work;
            handles.push(scope.spawn(move || loop {
                if stop.is_stop_requested() {
                    break;
                }
                let next = work
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .pop_front();
                let Some(index) = next else {
                    break;
                };
                let res = fetcher.fetch(&tasks[index]);
                if tx.send((index, res)).is_err() {
                    break;
                }
            }));
        }
        drop(tx);

        // Ends once every worker has exited and dropped its sender.
        for (index, res) in rx {
            counts.completed += 1;
            if !res.outcome.is_ok() {
                counts.failed += 1;
            }
            slots[index] = Some(res);
            on_progress(counts);
        }

        for h in handles {
            if h.join().is_err() {
                tracing::error!("download worker panicked");
            }
        }
    });

    let stopped = stop.is_stop_requested();
    let mut unfinished = 0;
    let results: Vec<DownloadResult> = slots
        .into_iter()
        .zip(tasks)
        .map(|(slot, task)| {
            slot.unwrap_or_else(|| {
                unfinished += 1;
                let reason = if stopped {
                    FailureReason::Cancelled
                } else {
                    FailureReason::WorkerLost
                };
                DownloadResult::failed(task.clone(), reason, 0)
            })
        })
        .collect();

    // Undispatched tasks still count toward the total; close out the progress.
    if unfinished > 0 {
        counts.completed += unfinished;
        counts.failed += unfinished;
        on_progress(counts);
    }
    results
}
