use crate::model::ChapterId;

/// Which chapters of a series to process.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChapterSelection {
    /// Drop chapters numbered below this (and chapters with no number).
    pub start_at: Option<f64>,
    /// Only the first chapter left after `start_at`.
    pub single: bool,
}

impl ChapterSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn starting_at(number: f64) -> Self {
        Self {
            start_at: Some(number),
            single: false,
        }
    }

    pub fn single(number: Option<f64>) -> Self {
        Self {
            start_at: number,
            single: true,
        }
    }

    /// Filters `chapters` (in reading order) before anything is downloaded.
    pub fn apply(&self, chapters: Vec<ChapterId>) -> Vec<ChapterId> {
        self.apply_by(chapters, |c| c)
    }

    /// Like `apply`, for items that carry a `ChapterId`.
    pub fn apply_by<T>(&self, items: Vec<T>, chapter: impl Fn(&T) -> &ChapterId) -> Vec<T> {
        let mut selected: Vec<T> = match self.start_at {
            Some(start) => items
                .into_iter()
                .filter(|item| match chapter(item).number() {
                    Some(n) => n >= start,
                    None => {
                        tracing::debug!(chapter = %chapter(item), "no chapter number; skipped by start filter");
                        false
                    }
                })
                .collect(),
            None => items,
        };
        if self.single {
            selected.truncate(1);
        }
        selected
    }
}
