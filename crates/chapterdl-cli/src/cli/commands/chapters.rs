//! `chapterdl chapters` – list what a manifest would download.

use anyhow::Result;
use chapterdl_core::discovery::{ManifestDiscovery, UrlDiscovery};
use chapterdl_core::model::assign_folder_names;
use std::path::Path;

pub fn run_chapters(manifest: &Path) -> Result<()> {
    let discovery = ManifestDiscovery::load(manifest)?;
    let chapters = discovery.chapters()?;
    println!("{} ({} chapter(s))", discovery.series_title()?, chapters.len());
    if chapters.is_empty() {
        return Ok(());
    }
    println!("{:<12} {:>7}  {:<20} {}", "NUMBER", "IMAGES", "FOLDER", "CHAPTER");
    let folders = assign_folder_names(&chapters);
    for (chapter, folder) in chapters.iter().zip(folders) {
        let number = chapter
            .number()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        let images = discovery.images(chapter).map(|urls| urls.len()).unwrap_or(0);
        println!(
            "{:<12} {:>7}  {:<20} {}",
            number,
            images,
            folder,
            chapter
        );
    }
    Ok(())
}
