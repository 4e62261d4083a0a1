//! Progress reporting trait for the crawl.
//!
//! [`ProgressCallback`] decouples progress reporting from any rendering
//! backend. The CLI renders it with `indicatif`; tests use
//! [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from a running crawl.
pub trait ProgressCallback: Send + Sync {
    /// Set the total number of detail pages to visit.
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` pages.
    fn inc(&self, delta: u64);

    /// Update the message shown next to the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// A [`ProgressCallback`] that ignores everything.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
