//! Progress-callback trait for per-page and per-document events.
//!
//! Inject an [`Arc<dyn ProcessingProgressCallback>`] via
//! [`crate::config::ProcessingConfigBuilder::progress_callback`] to receive
//! real-time events as pipelines work through pages and the batch layer works
//! through documents.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a log, or a terminal progress bar without the
//! library knowing anything about how the host application communicates. The
//! trait is `Send + Sync` because page jobs run concurrently on blocking
//! worker threads.

use std::sync::Arc;

/// Called by the pipelines and the batch coordinator as work progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// `on_page_complete` and `on_page_error` may be called concurrently from
/// different threads, and out of page order. Implementations must protect
/// shared mutable state (e.g. `Mutex`, `AtomicUsize`).
pub trait ProcessingProgressCallback: Send + Sync {
    /// Called once per pipeline run, before any page job starts.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be attempted
    fn on_pipeline_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when a page job finishes successfully.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — pages being attempted in this run
    /// * `output_len`  — bytes of extracted text, or 0 for an image page
    fn on_page_complete(&self, page_num: usize, total_pages: usize, output_len: usize) {
        let _ = (page_num, total_pages, output_len);
    }

    /// Called when a page job fails (the run continues without it).
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: String) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once per pipeline run after every page has been attempted.
    fn on_pipeline_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }

    /// Called once per batch run, before any document job starts.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called when a document finishes, successfully or not.
    fn on_document_complete(&self, pdf_name: String, success: bool) {
        let _ = (pdf_name, success);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ProcessingProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ProcessingConfig`].
pub type ProgressCallback = Arc<dyn ProcessingProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        completes: Arc<AtomicUsize>,
        errors: Arc<AtomicUsize>,
        documents: Arc<AtomicUsize>,
    }

    impl ProcessingProgressCallback for TrackingCallback {
        fn on_page_complete(&self, _page: usize, _total: usize, _len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_error(&self, _page: usize, _total: usize, _error: String) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_complete(&self, _name: String, _success: bool) {
            self.documents.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_pipeline_start(5);
        cb.on_page_complete(1, 5, 42);
        cb.on_page_error(2, 5, "some error".to_string());
        cb.on_pipeline_complete(5, 4);
        cb.on_batch_start(2);
        cb.on_document_complete("a.pdf".to_string(), true);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            completes: Arc::new(AtomicUsize::new(0)),
            errors: Arc::new(AtomicUsize::new(0)),
            documents: Arc::new(AtomicUsize::new(0)),
        };

        tracker.on_page_complete(1, 3, 100);
        tracker.on_page_complete(2, 3, 200);
        tracker.on_page_error(3, 3, "boom".to_string());
        tracker.on_document_complete("doc".to_string(), false);

        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.documents.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_moves_into_spawn() {
        // The String error payload keeps the trait object Send-compatible
        // when moved into a spawned task.
        let cb: Arc<dyn ProcessingProgressCallback> = Arc::new(NoopProgressCallback);
        std::thread::spawn(move || {
            cb.on_page_error(2, 5, "worker-side error".to_string());
        })
        .join()
        .unwrap();
    }
}
