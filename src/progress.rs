//! Progress-callback trait for per-document and per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractProgressCallback>`] via
//! [`crate::config::ExtractConfigBuilder::progress_callback`] to receive
//! events as the run walks each look book. The CLI renders them as a
//! progress bar; library callers can log, count, or ignore them.
//!
//! # Example
//!
//! ```rust
//! use lookbook_catalog::{ExtractConfig, ExtractProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct ItemCounter {
//!     items: AtomicUsize,
//! }
//!
//! impl ExtractProgressCallback for ItemCounter {
//!     fn on_page_complete(&self, _slug: &str, _page: usize, _total: usize, item_count: usize) {
//!         self.items.fetch_add(item_count, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(ItemCounter { items: AtomicUsize::new(0) });
//! let config = ExtractConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::catalog::DocumentStats;
use std::sync::Arc;

/// Called by the extraction run as it processes each document and page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ExtractProgressCallback: Send + Sync {
    /// Called once after the PDFs have been discovered.
    fn on_run_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called after a document is opened, before its first page.
    fn on_document_start(&self, slug: &str, label: &str, total_pages: usize) {
        let _ = (slug, label, total_pages);
    }

    /// Called after a page's items have been extracted.
    ///
    /// * `page_num`   — 1-indexed page number
    /// * `item_count` — items kept on the page after heading rejection
    fn on_page_complete(&self, slug: &str, page_num: usize, total_pages: usize, item_count: usize) {
        let _ = (slug, page_num, total_pages, item_count);
    }

    /// Called when a page image fails to render or write. Non-fatal.
    fn on_page_error(&self, slug: &str, page_num: usize, total_pages: usize, error: &str) {
        let _ = (slug, page_num, total_pages, error);
    }

    /// Called once a document's pages have all been visited.
    fn on_document_complete(&self, slug: &str, stats: &DocumentStats) {
        let _ = (slug, stats);
    }

    /// Called when a document is skipped because it could not be opened.
    fn on_document_skipped(&self, path: &str, error: &str) {
        let _ = (path, error);
    }

    /// Called once after the catalog has been written.
    fn on_run_complete(&self, total_documents: usize, skipped_documents: usize) {
        let _ = (total_documents, skipped_documents);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractConfig`].
pub type ProgressCallback = Arc<dyn ExtractProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Tracking {
        pages: AtomicUsize,
        items: AtomicUsize,
        errors: AtomicUsize,
    }

    impl ExtractProgressCallback for Tracking {
        fn on_page_complete(&self, _: &str, _: usize, _: usize, item_count: usize) {
            self.pages.fetch_add(1, Ordering::SeqCst);
            self.items.fetch_add(item_count, Ordering::SeqCst);
        }

        fn on_page_error(&self, _: &str, _: usize, _: usize, _: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(2);
        cb.on_document_start("a", "A", 3);
        cb.on_page_complete("a", 1, 3, 4);
        cb.on_page_error("a", 2, 3, "boom");
        cb.on_document_complete("a", &DocumentStats::default());
        cb.on_document_skipped("b.pdf", "corrupt");
        cb.on_run_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracking = Arc::new(Tracking::default());
        let cb: ProgressCallback = tracking.clone();
        cb.on_page_complete("a", 1, 2, 3);
        cb.on_page_complete("a", 2, 2, 0);
        cb.on_page_error("a", 2, 2, "render");
        cb.on_document_complete("a", &DocumentStats::default());

        assert_eq!(tracking.pages.load(Ordering::SeqCst), 2);
        assert_eq!(tracking.items.load(Ordering::SeqCst), 3);
        assert_eq!(tracking.errors.load(Ordering::SeqCst), 1);
    }
}
