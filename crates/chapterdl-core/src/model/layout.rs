use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::chapter::ChapterId;
use crate::url_model::sanitize_filename;

/// On-disk layout for one series:
/// `<output>/<Series>/<folder>/` for loose images and `<output>/<Series>/<folder>.cbz`.
#[derive(Debug, Clone)]
pub struct SeriesLayout {
    series_dir: PathBuf,
}

impl SeriesLayout {
    pub fn new(output_folder: &Path, series_name: &str) -> Self {
        Self {
            series_dir: output_folder.join(sanitize_filename(series_name)),
        }
    }

    pub fn series_dir(&self) -> &Path {
        &self.series_dir
    }

    pub fn chapter_dir(&self, folder: &str) -> PathBuf {
        self.series_dir.join(folder)
    }

    pub fn archive_path(&self, folder: &str) -> PathBuf {
        self.series_dir.join(format!("{}.cbz", folder))
    }
}

/// Folder name for every chapter of a series, in the same order, all distinct.
///
/// Chapters normally get `Chapter_<NN>`. When several chapters share that name
/// (`"Vol. 1 Ch. 1"` / `"Vol. 1 Ch. 2"`, or `"Chapter 100"` / `"Chapter 100 (Raw)"`)
/// each of them is named after its full label instead, and anything still
/// clashing gets a `_2`, `_3`... suffix. Computed over the whole discovered list
/// so names do not depend on which chapters are selected.
pub fn assign_folder_names(chapters: &[ChapterId]) -> Vec<String> {
    let mut by_number: HashMap<String, usize> = HashMap::new();
    for chapter in chapters {
        *by_number.entry(chapter.folder_name()).or_insert(0) += 1;
    }

    let mut taken: HashSet<String> = HashSet::with_capacity(chapters.len());
    chapters
        .iter()
        .map(|chapter| {
            let base = chapter.folder_name();
            let base = if by_number[&base] > 1 {
                chapter.label_folder_name()
            } else {
                base
            };
            let mut name = base.clone();
            let mut n = 2;
            while taken.contains(&name) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}
