//! Disk I/O and file lifecycle for downloaded images.
//!
//! Bodies are streamed into `<destination>.part` and only renamed to the final
//! name once the transfer is complete, so a failed or interrupted download never
//! leaves a partial file under the destination path.

mod writer;

pub use writer::StorageWriter;

use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `0001.jpg` → `0001.jpg.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// True when `path` holds a non-empty regular file (treated as already downloaded).
pub fn is_complete_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
