use std::path::{Path, PathBuf};

use super::chapter::ChapterId;
use crate::url_model::extension_from_url;

/// Minimum zero-padding for image filenames.
const MIN_PAD_WIDTH: usize = 4;

/// One image to download. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTask {
    pub chapter: ChapterId,
    /// 1-based position in the chapter; drives filename and archive order.
    pub sequence_index: u32,
    pub source_url: String,
    pub destination: PathBuf,
}

impl ImageTask {
    /// Filename as stored in the chapter folder and in the archive.
    pub fn file_name(&self) -> String {
        self.destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Terminal state of a chapter's download phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCompletion {
    /// Not run yet.
    Pending,
    /// Every task ended Success or Skipped; eligible for packaging.
    Complete,
    /// At least one task ended Failed; packaging is blocked.
    PartiallyFailed { failed: usize },
}

/// A chapter's ordered image tasks and their destination folder.
#[derive(Debug, Clone)]
pub struct ChapterJob {
    chapter: ChapterId,
    folder: PathBuf,
    tasks: Vec<ImageTask>,
    completion: JobCompletion,
}

impl ChapterJob {
    /// Builds one task per URL, numbered from 1 in discovery order, with
    /// destination `<folder>/<index padded>.<ext>`.
    pub fn new(chapter: ChapterId, folder: PathBuf, urls: Vec<String>) -> Self {
        let width = pad_width(urls.len());
        let tasks = urls
            .into_iter()
            .enumerate()
            .map(|(i, url)| {
                let sequence_index = i as u32 + 1;
                let ext = extension_from_url(&url);
                let name = format!("{:0width$}.{}", sequence_index, ext, width = width);
                ImageTask {
                    chapter: chapter.clone(),
                    sequence_index,
                    destination: folder.join(name),
                    source_url: url,
                }
            })
            .collect();
        Self {
            chapter,
            folder,
            tasks,
            completion: JobCompletion::Pending,
        }
    }

    pub fn chapter(&self) -> &ChapterId {
        &self.chapter
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Tasks in sequence order.
    pub fn tasks(&self) -> &[ImageTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn completion(&self) -> JobCompletion {
        self.completion
    }

    pub(crate) fn set_completion(&mut self, completion: JobCompletion) {
        self.completion = completion;
    }
}

fn pad_width(total: usize) -> usize {
    total.to_string().len().max(MIN_PAD_WIDTH)
}
