//! Single HTTP GET streamed into a temp file, renamed on success.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::HttpOptions;
use crate::retry::FetchError;
use crate::storage::StorageWriter;

/// Performs one GET of `url`, writing the body to `temp` and renaming it to
/// `destination` once status and length check out. Returns bytes written.
/// On any error the temp file is removed before returning.
pub(super) fn get_to_file(
    url: &str,
    temp: &Path,
    destination: &Path,
    opts: &HttpOptions,
) -> Result<u64, FetchError> {
    let writer = StorageWriter::create(temp).map_err(FetchError::Storage)?;
    match transfer(url, &writer, opts) {
        Ok(written) => {
            writer.sync().map_err(FetchError::Storage)?;
            writer.finalize(destination).map_err(FetchError::Storage)?;
            Ok(written)
        }
        Err(e) => {
            writer.discard();
            Err(e)
        }
    }
}

fn transfer(url: &str, writer: &StorageWriter, opts: &HttpOptions) -> Result<u64, FetchError> {
    let written = Arc::new(AtomicU64::new(0));
    let written_cb = Arc::clone(&written);
    let storage_error: Arc<Mutex<Option<std::io::Error>>> = Arc::new(Mutex::new(None));
    let storage_error_cb = Arc::clone(&storage_error);
    let storage = writer.clone();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    if let Some(ua) = &opts.user_agent {
        easy.useragent(ua)?;
    }
    easy.connect_timeout(opts.connect_timeout)?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(opts.low_speed_time)?;
    easy.timeout(opts.timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(move |data| {
            let off = written_cb.fetch_add(data.len() as u64, Ordering::Relaxed);
            match storage.write_at(off, data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    if let Ok(mut slot) = storage_error_cb.lock() {
                        slot.replace(e);
                    }
                    Ok(0) // abort transfer
                }
            }
        })?;
        if let Err(e) = transfer.perform() {
            if e.is_write_error() {
                if let Some(io_err) = storage_error.lock().ok().and_then(|mut s| s.take()) {
                    return Err(FetchError::Storage(io_err));
                }
            }
            return Err(FetchError::Curl(e));
        }
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }

    let received = written.load(Ordering::Relaxed);
    if received == 0 {
        return Err(FetchError::EmptyBody);
    }
    let declared = easy.content_length_download()?;
    if declared >= 0.0 {
        let expected = declared as u64;
        if received != expected {
            return Err(FetchError::Truncated { expected, received });
        }
    }
    Ok(received)
}
