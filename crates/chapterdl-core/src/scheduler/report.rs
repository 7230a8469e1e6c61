use crate::model::{ChapterId, DownloadOutcome, DownloadResult};

/// Every task's terminal result for one chapter, in sequence order.
#[derive(Debug, Clone)]
pub struct ChapterReport {
    chapter: ChapterId,
    results: Vec<DownloadResult>,
}

impl ChapterReport {
    pub(crate) fn new(chapter: ChapterId, results: Vec<DownloadResult>) -> Self {
        Self { chapter, results }
    }

    pub fn chapter(&self) -> &ChapterId {
        &self.chapter
    }

    pub fn results(&self) -> &[DownloadResult] {
        &self.results
    }

    /// True when nothing failed; the chapter may be packaged.
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &DownloadResult> {
        self.results.iter().filter(|r| !r.outcome.is_ok())
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| *o == DownloadOutcome::Success)
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| *o == DownloadOutcome::Skipped)
    }

    fn count(&self, f: impl Fn(&DownloadOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| f(&r.outcome)).count()
    }
}
