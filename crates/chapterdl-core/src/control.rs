//! Cooperative stop: a shared flag checked at task and chapter boundaries.
//!
//! In-flight downloads are never interrupted; once the flag is set no new image
//! is dispatched and no new chapter is started.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle to one stop flag.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop (e.g. from a Ctrl-C handler).
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
