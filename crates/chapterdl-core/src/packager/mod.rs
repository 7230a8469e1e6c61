//! Chapter packaging: loose images → `Chapter_<NN>.cbz`.
//!
//! The sequence is write (to a `.part` file) → rename → verify → cleanup.
//! Cleanup takes a `VerifiedArchive`, which only `verify` can produce, so the
//! source folder cannot be removed before the archive has been read back.

mod archive;
mod error;

pub use archive::VerifiedArchive;
pub use error::PackagingError;

use std::path::{Path, PathBuf};

use crate::model::{ChapterJob, DownloadResult};
use crate::storage;

#[derive(Debug, Clone, Copy, Default)]
pub struct ChapterPackager {
    cleanup: bool,
}

impl ChapterPackager {
    /// `cleanup`: remove the chapter folder after the archive is verified.
    pub fn new(cleanup: bool) -> Self {
        Self { cleanup }
    }

    /// Archive path for a job: `<folder>.cbz` next to its folder.
    pub fn archive_path(job: &ChapterJob) -> PathBuf {
        let mut name = job.folder().file_name().unwrap_or_default().to_os_string();
        name.push(".cbz");
        job.folder().with_file_name(name)
    }

    /// Packs a fully downloaded chapter and returns the archive path.
    ///
    /// Fails with `PackagingError::Blocked` (writing nothing) unless every task
    /// of `job` has a Success or Skipped result in `results`.
    pub fn pack(&self, job: &ChapterJob, results: &[DownloadResult]) -> Result<PathBuf, PackagingError> {
        check_eligible(job, results)?;

        let target = Self::archive_path(job);
        let entries: Vec<(String, &Path)> = job
            .tasks()
            .iter()
            .map(|t| (t.file_name(), t.destination.as_path()))
            .collect();
        for (_, path) in &entries {
            if !storage::is_complete_file(path) {
                return Err(PackagingError::io(
                    "missing image",
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "file missing or empty"),
                ));
            }
        }

        archive::write_archive(&target, &entries)?;
        let expected: Vec<String> = entries.into_iter().map(|(name, _)| name).collect();
        let verified = match archive::verify(&target, &expected) {
            Ok(v) => v,
            Err(e) => {
                let _ = std::fs::remove_file(&target);
                return Err(e);
            }
        };
        tracing::info!(
            chapter = %job.chapter(),
            entries = verified.entries(),
            "wrote {}",
            verified.path().display()
        );

        if self.cleanup {
            remove_source_folder(job.folder(), &verified);
        }
        Ok(verified.into_path())
    }
}

fn check_eligible(job: &ChapterJob, results: &[DownloadResult]) -> Result<(), PackagingError> {
    let failed: Vec<u32> = job
        .tasks()
        .iter()
        .filter(|task| {
            !results
                .iter()
                .any(|r| r.task.sequence_index == task.sequence_index && r.outcome.is_ok())
        })
        .map(|task| task.sequence_index)
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(PackagingError::Blocked {
            chapter: job.chapter().clone(),
            failed,
        })
    }
}

/// Only callable with proof that the archive was read back successfully.
/// A failed removal leaves the images in place and is logged, not returned:
/// the archive itself is already complete.
fn remove_source_folder(folder: &Path, verified: &VerifiedArchive) {
    match std::fs::remove_dir_all(folder) {
        Ok(()) => tracing::debug!(
            "removed {} after verifying {}",
            folder.display(),
            verified.path().display()
        ),
        Err(e) => tracing::warn!("could not remove {}: {}", folder.display(), e),
    }
}
