//! File-backed discovery: a JSON manifest listing chapters and their images.
//!
//! ```json
//! { "series": "Some Series",
//!   "chapters": [ { "id": "Chapter 1", "images": ["https://cdn.example.com/1/001.jpg"] } ] }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::UrlDiscovery;
use crate::model::ChapterId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestChapter {
    pub id: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub series: String,
    pub chapters: Vec<ManifestChapter>,
}

/// `UrlDiscovery` backed by an in-memory `Manifest`.
#[derive(Debug, Clone)]
pub struct ManifestDiscovery {
    manifest: Manifest,
}

impl ManifestDiscovery {
    pub fn new(manifest: Manifest) -> Self {
        Self { manifest }
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(data).context("invalid manifest JSON")?;
        Ok(Self::new(manifest))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("manifest {}", path.display()))
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

impl UrlDiscovery for ManifestDiscovery {
    fn series_title(&self) -> Result<String> {
        Ok(self.manifest.series.clone())
    }

    fn chapters(&self) -> Result<Vec<ChapterId>> {
        Ok(self
            .manifest
            .chapters
            .iter()
            .map(|c| ChapterId::new(c.id.as_str()))
            .collect())
    }

    fn images(&self, chapter: &ChapterId) -> Result<Vec<String>> {
        self.manifest
            .chapters
            .iter()
            .find(|c| c.id.trim() == chapter.label())
            .map(|c| c.images.clone())
            .with_context(|| format!("chapter {:?} not in manifest", chapter.label()))
    }
}
