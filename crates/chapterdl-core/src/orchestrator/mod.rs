//! Series orchestrator: chapters one after another, images within a chapter concurrently.
//!
//! Per chapter: discover images → download (scheduler) → package (packager).
//! Chapter-level failures are recorded in the summary and never stop the run.

mod selection;
mod state;
mod summary;

pub use selection::ChapterSelection;
pub use state::ChapterState;
pub use summary::{ChapterOutcome, ChapterRecord, FailedImage, SeriesSummary};

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ChapterDlConfig;
use crate::control::StopToken;
use crate::discovery::UrlDiscovery;
use crate::fetch::{Fetcher, HttpOptions};
use crate::model::{assign_folder_names, ChapterId, ChapterJob, JobCompletion, SeriesLayout};
use crate::packager::ChapterPackager;
use crate::rate_limit::RateLimiter;
use crate::scheduler::{DownloadScheduler, ProgressObserver};

use state::ChapterTracker;

pub struct SeriesOrchestrator<'a> {
    discovery: &'a dyn UrlDiscovery,
    scheduler: DownloadScheduler,
    /// `None` when archiving is disabled.
    packager: Option<ChapterPackager>,
    output_folder: PathBuf,
}

impl<'a> SeriesOrchestrator<'a> {
    pub fn new(
        discovery: &'a dyn UrlDiscovery,
        scheduler: DownloadScheduler,
        packager: Option<ChapterPackager>,
        output_folder: PathBuf,
    ) -> Self {
        Self {
            discovery,
            scheduler,
            packager,
            output_folder,
        }
    }

    /// Wires one rate limiter, fetcher, scheduler and packager from `cfg`.
    /// The limiter is shared by every worker for the whole run.
    pub fn from_config(cfg: &ChapterDlConfig, discovery: &'a dyn UrlDiscovery, stop: StopToken) -> Self {
        let limiter = Arc::new(RateLimiter::new(cfg.request_interval()));
        let http = HttpOptions {
            user_agent: cfg.user_agent.clone(),
            connect_timeout: cfg.connect_timeout(),
            ..HttpOptions::default()
        };
        let fetcher = Arc::new(Fetcher::new(limiter, cfg.retry_policy(), http));
        let scheduler = DownloadScheduler::new(fetcher, cfg.worker_pool_size, stop);
        let packager = cfg
            .create_archive
            .then(|| ChapterPackager::new(cfg.cleanup_after_packaging));
        Self::new(discovery, scheduler, packager, cfg.output_folder.clone())
    }

    /// Processes the selected chapters in order and returns the per-chapter summary.
    ///
    /// Errors only when the series itself cannot be set up (title or chapter
    /// list discovery, series folder creation).
    pub fn run(&self, selection: &ChapterSelection, observer: &dyn ProgressObserver) -> Result<SeriesSummary> {
        let title = self.discovery.series_title().context("series title discovery")?;
        let layout = SeriesLayout::new(&self.output_folder, &title);
        std::fs::create_dir_all(layout.series_dir())
            .with_context(|| format!("failed to create {}", layout.series_dir().display()))?;

        let all = self.discovery.chapters().context("chapter discovery")?;
        let names = assign_folder_names(&all);
        for (chapter, folder) in all.iter().zip(&names) {
            if *folder != chapter.folder_name() {
                tracing::warn!(chapter = %chapter, "folder name shared with another chapter; using {}", folder);
            }
        }
        let planned: Vec<(ChapterId, String)> = all.into_iter().zip(names).collect();
        let chapters = selection.apply_by(planned, |(c, _)| c);
        tracing::info!(series = %title, chapters = chapters.len(), "starting series");

        let stop = self.scheduler.stop_token();
        let mut summary = SeriesSummary::new(title);
        for (chapter, folder) in chapters {
            if stop.is_stop_requested() {
                summary.push(ChapterRecord {
                    chapter,
                    state: ChapterState::Pending,
                    outcome: ChapterOutcome::NotStarted,
                });
                continue;
            }
            let record = self.process_chapter(&layout, chapter, &folder, observer);
            if !record.outcome.is_success() {
                tracing::warn!(chapter = %record.chapter, state = %record.state, "chapter did not complete");
            }
            summary.push(record);
        }
        Ok(summary)
    }

    fn process_chapter(
        &self,
        layout: &SeriesLayout,
        chapter: ChapterId,
        folder: &str,
        observer: &dyn ProgressObserver,
    ) -> ChapterRecord {
        let mut tracker = ChapterTracker::new(chapter.clone());
        let archive = layout.archive_path(folder);

        if self.packager.is_some() && archive.is_file() {
            tracing::info!(chapter = %chapter, "archive already present: {}", archive.display());
            tracker.advance(ChapterState::Done);
            return finish(tracker, chapter, ChapterOutcome::AlreadyPackaged { archive });
        }

        let urls = match self.discovery.images(&chapter) {
            Ok(urls) if !urls.is_empty() => urls,
            Ok(_) => {
                tracker.advance(ChapterState::DiscoveryFailed);
                let reason = "no images found".to_string();
                return finish(tracker, chapter, ChapterOutcome::DiscoveryFailed { reason });
            }
            Err(e) => {
                tracker.advance(ChapterState::DiscoveryFailed);
                let reason = format!("{:#}", e);
                return finish(tracker, chapter, ChapterOutcome::DiscoveryFailed { reason });
            }
        };

        tracker.advance(ChapterState::Downloading);
        let mut job = ChapterJob::new(chapter.clone(), layout.chapter_dir(folder), urls);
        let report = self.scheduler.run(&mut job, observer);

        if let JobCompletion::PartiallyFailed { .. } = job.completion() {
            tracker.advance(ChapterState::DownloadFailedPartial);
            let failed = report.failed().map(FailedImage::from).collect();
            return finish(tracker, chapter, ChapterOutcome::DownloadFailedPartial { failed });
        }

        let Some(packager) = &self.packager else {
            tracker.advance(ChapterState::Done);
            let outcome = ChapterOutcome::Downloaded {
                folder: job.folder().to_path_buf(),
                images: job.len(),
            };
            return finish(tracker, chapter, outcome);
        };

        tracker.advance(ChapterState::Packaging);
        match packager.pack(&job, report.results()) {
            Ok(archive) => {
                tracker.advance(ChapterState::Done);
                let outcome = ChapterOutcome::Packaged {
                    archive,
                    images: job.len(),
                };
                finish(tracker, chapter, outcome)
            }
            Err(e) => {
                tracing::warn!(chapter = %chapter, "packaging failed: {}", e);
                tracker.advance(ChapterState::PackagingFailed);
                let reason = e.to_string();
                finish(tracker, chapter, ChapterOutcome::PackagingFailed { reason })
            }
        }
    }
}

fn finish(tracker: ChapterTracker, chapter: ChapterId, outcome: ChapterOutcome) -> ChapterRecord {
    ChapterRecord {
        chapter,
        state: tracker.state(),
        outcome,
    }
}

#[cfg(test)]
mod tests;
