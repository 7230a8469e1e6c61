//! Progress observer seam between the scheduler and whatever displays progress.

use crate::model::ProgressSnapshot;

/// Receives a snapshot after every finished task. Must return quickly; the
/// scheduler calls it on its collecting thread.
pub trait ProgressObserver {
    fn on_progress(&self, snapshot: &ProgressSnapshot);
}

/// Observer that ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&self, _snapshot: &ProgressSnapshot) {}
}

/// Fire-and-forget: a full channel drops the update instead of blocking downloads.
impl ProgressObserver for tokio::sync::mpsc::Sender<ProgressSnapshot> {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        let _ = self.try_send(snapshot.clone());
    }
}
