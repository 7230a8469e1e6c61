//! Per-chapter state machine.
//!
//! `Pending → Downloading → Packaging → Done`, with `DownloadFailedPartial`,
//! `PackagingFailed` and `DiscoveryFailed` as terminal error states. Packaging
//! is only reachable from a download phase that completed without failures.

use std::fmt;

use crate::model::ChapterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterState {
    Pending,
    Downloading,
    Packaging,
    Done,
    DownloadFailedPartial,
    PackagingFailed,
    DiscoveryFailed,
}

impl ChapterState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ChapterState::Done
                | ChapterState::DownloadFailedPartial
                | ChapterState::PackagingFailed
                | ChapterState::DiscoveryFailed
        )
    }

    pub fn can_advance_to(self, next: ChapterState) -> bool {
        use ChapterState::*;
        matches!(
            (self, next),
            (Pending, Downloading)
                | (Pending, Done)
                | (Pending, DiscoveryFailed)
                | (Downloading, Packaging)
                | (Downloading, Done)
                | (Downloading, DownloadFailedPartial)
                | (Packaging, Done)
                | (Packaging, PackagingFailed)
        )
    }
}

impl fmt::Display for ChapterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChapterState::Pending => "pending",
            ChapterState::Downloading => "downloading",
            ChapterState::Packaging => "packaging",
            ChapterState::Done => "done",
            ChapterState::DownloadFailedPartial => "download failed (partial)",
            ChapterState::PackagingFailed => "packaging failed",
            ChapterState::DiscoveryFailed => "discovery failed",
        };
        f.write_str(s)
    }
}

/// Tracks one chapter through its states and logs every transition.
#[derive(Debug)]
pub(super) struct ChapterTracker {
    chapter: ChapterId,
    state: ChapterState,
}

impl ChapterTracker {
    pub(super) fn new(chapter: ChapterId) -> Self {
        Self {
            chapter,
            state: ChapterState::Pending,
        }
    }

    pub(super) fn state(&self) -> ChapterState {
        self.state
    }

    pub(super) fn advance(&mut self, next: ChapterState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal chapter transition {:?} -> {:?}",
            self.state,
            next
        );
        if !self.state.can_advance_to(next) {
            tracing::error!(chapter = %self.chapter, from = %self.state, to = %next, "illegal chapter transition");
        }
        tracing::debug!(chapter = %self.chapter, from = %self.state, to = %next, "chapter state");
        self.state = next;
    }
}
