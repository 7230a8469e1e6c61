use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::ChapterId;

/// Why a chapter could not be packaged. Fatal for that chapter only.
#[derive(Debug, Error)]
pub enum PackagingError {
    /// Some images are missing or failed; nothing was written.
    #[error("chapter {chapter}: packaging blocked, {} image(s) not downloaded: {failed:?}", .failed.len())]
    Blocked { chapter: ChapterId, failed: Vec<u32> },
    /// Disk full, permission denied, missing file...
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
    /// Archive was written but did not read back as expected; it has been removed.
    #[error("archive {} failed verification: {detail}", .path.display())]
    Verification { path: PathBuf, detail: String },
}

impl PackagingError {
    pub(crate) fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        PackagingError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, PackagingError::Blocked { .. })
    }
}
