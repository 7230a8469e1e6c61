//! End-of-run summary: which chapters finished, which lost images, which failed to package.

use std::fmt;
use std::path::PathBuf;

use super::state::ChapterState;
use crate::model::{ChapterId, DownloadResult, FailureReason};

/// One image that did not make it to disk.
#[derive(Debug, Clone)]
pub struct FailedImage {
    pub index: u32,
    pub url: String,
    pub reason: FailureReason,
}

impl From<&DownloadResult> for FailedImage {
    fn from(r: &DownloadResult) -> Self {
        Self {
            index: r.task.sequence_index,
            url: r.task.source_url.clone(),
            reason: r.failure().cloned().unwrap_or(FailureReason::WorkerLost),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ChapterOutcome {
    /// Downloaded and archived.
    Packaged { archive: PathBuf, images: usize },
    /// Downloaded; archiving disabled.
    Downloaded { folder: PathBuf, images: usize },
    /// Archive found from an earlier run; nothing downloaded.
    AlreadyPackaged { archive: PathBuf },
    /// Some images failed after retries; not packaged, images kept.
    DownloadFailedPartial { failed: Vec<FailedImage> },
    PackagingFailed { reason: String },
    DiscoveryFailed { reason: String },
    /// A stop was requested before this chapter began.
    NotStarted,
}

impl ChapterOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ChapterOutcome::Packaged { .. }
                | ChapterOutcome::Downloaded { .. }
                | ChapterOutcome::AlreadyPackaged { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct ChapterRecord {
    pub chapter: ChapterId,
    /// Last state reached (`Pending` for chapters that never started).
    pub state: ChapterState,
    pub outcome: ChapterOutcome,
}

#[derive(Debug, Clone)]
pub struct SeriesSummary {
    pub series: String,
    pub chapters: Vec<ChapterRecord>,
}

impl SeriesSummary {
    pub fn new(series: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            chapters: Vec::new(),
        }
    }

    pub(super) fn push(&mut self, record: ChapterRecord) {
        self.chapters.push(record);
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ChapterRecord> {
        self.chapters.iter().filter(|c| c.outcome.is_success())
    }

    pub fn partially_failed(&self) -> impl Iterator<Item = &ChapterRecord> {
        self.chapters
            .iter()
            .filter(|c| matches!(c.outcome, ChapterOutcome::DownloadFailedPartial { .. }))
    }

    pub fn packaging_failed(&self) -> impl Iterator<Item = &ChapterRecord> {
        self.chapters
            .iter()
            .filter(|c| matches!(c.outcome, ChapterOutcome::PackagingFailed { .. }))
    }

    /// True when every selected chapter succeeded.
    pub fn is_success(&self) -> bool {
        self.chapters.iter().all(|c| c.outcome.is_success())
    }
}

impl fmt::Display for SeriesSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} of {} chapter(s) complete",
            self.series,
            self.succeeded().count(),
            self.chapters.len()
        )?;
        for record in &self.chapters {
            match &record.outcome {
                ChapterOutcome::Packaged { archive, images } => {
                    writeln!(f, "  ok      {} ({} images) -> {}", record.chapter, images, archive.display())?
                }
                ChapterOutcome::Downloaded { folder, images } => {
                    writeln!(f, "  ok      {} ({} images) -> {}", record.chapter, images, folder.display())?
                }
                ChapterOutcome::AlreadyPackaged { archive } => {
                    writeln!(f, "  exists  {} -> {}", record.chapter, archive.display())?
                }
                ChapterOutcome::DownloadFailedPartial { failed } => {
                    writeln!(f, "  partial {}: {} image(s) failed", record.chapter, failed.len())?;
                    for img in failed {
                        writeln!(f, "            #{} {}: {}", img.index, img.url, img.reason)?;
                    }
                }
                ChapterOutcome::PackagingFailed { reason } => {
                    writeln!(f, "  nopack  {}: {}", record.chapter, reason)?
                }
                ChapterOutcome::DiscoveryFailed { reason } => {
                    writeln!(f, "  nourls  {}: {}", record.chapter, reason)?
                }
                ChapterOutcome::NotStarted => writeln!(f, "  stopped {}", record.chapter)?,
            }
        }
        Ok(())
    }
}
