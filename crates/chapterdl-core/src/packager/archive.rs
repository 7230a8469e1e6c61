//! ZIP writing and read-back verification.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::error::PackagingError;
use crate::storage::temp_path;

/// An archive that was reopened and matched the expected entry list.
#[derive(Debug)]
pub struct VerifiedArchive {
    path: PathBuf,
    entries: usize,
}

impl VerifiedArchive {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// Writes `entries` (archive name, source file) in the given order into
/// `<target>.part`, syncs it and renames it to `target`.
pub(super) fn write_archive(target: &Path, entries: &[(String, &Path)]) -> Result<(), PackagingError> {
    let part = temp_path(target);
    let result = write_part(&part, entries).and_then(|()| {
        std::fs::rename(&part, target).map_err(|e| PackagingError::io("rename", &part, e))
    });
    if result.is_err() {
        let _ = std::fs::remove_file(&part);
    }
    result
}

fn write_part(part: &Path, entries: &[(String, &Path)]) -> Result<(), PackagingError> {
    let file = File::create(part).map_err(|e| PackagingError::io("create", part, e))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, source) in entries {
        zip.start_file(name.as_str(), options)?;
        let mut input = File::open(source).map_err(|e| PackagingError::io("open", source, e))?;
        io::copy(&mut input, &mut zip).map_err(|e| PackagingError::io("write", part, e))?;
    }
    let file = zip.finish()?;
    file.sync_all().map_err(|e| PackagingError::io("sync", part, e))?;
    Ok(())
}

/// Reopens `path`, checks entry names and order against `expected`, and reads
/// every entry to the end so CRC mismatches surface.
pub(super) fn verify(path: &Path, expected: &[String]) -> Result<VerifiedArchive, PackagingError> {
    let file = File::open(path).map_err(|e| PackagingError::io("open", path, e))?;
    let mut archive = ZipArchive::new(file)?;
    if archive.len() != expected.len() {
        return Err(PackagingError::Verification {
            path: path.to_path_buf(),
            detail: format!("expected {} entries, found {}", expected.len(), archive.len()),
        });
    }
    for (i, want) in expected.iter().enumerate() {
        let mut entry = archive.by_index(i)?;
        if entry.name() != want {
            return Err(PackagingError::Verification {
                path: path.to_path_buf(),
                detail: format!("entry {} is {:?}, expected {:?}", i, entry.name(), want),
            });
        }
        io::copy(&mut entry, &mut io::sink()).map_err(|e| PackagingError::Verification {
            path: path.to_path_buf(),
            detail: format!("entry {:?} unreadable: {}", want, e),
        })?;
    }
    Ok(VerifiedArchive {
        path: path.to_path_buf(),
        entries: expected.len(),
    })
}
