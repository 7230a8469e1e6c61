//! URL discovery interface.
//!
//! The download engine does not parse HTML. It asks a `UrlDiscovery`
//! implementation for a series' chapters and each chapter's image URLs, both
//! already in reading order.

mod manifest;

pub use manifest::{Manifest, ManifestChapter, ManifestDiscovery};

use crate::model::ChapterId;

/// Source of chapter and image URLs, in reading order.
pub trait UrlDiscovery {
    /// Display title of the series (used for the series folder name).
    fn series_title(&self) -> anyhow::Result<String>;

    /// Chapters of the series, first to last.
    fn chapters(&self) -> anyhow::Result<Vec<ChapterId>>;

    /// Image URLs of one chapter, first page to last.
    fn images(&self, chapter: &ChapterId) -> anyhow::Result<Vec<String>>;
}
