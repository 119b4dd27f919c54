//! Error types for the lookbook-catalog library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`CatalogError`] — **Fatal**: the run (or a single document, when
//!   `keep_going` is set) cannot proceed: missing input directory, a PDF
//!   that will not open, an unwritable catalog, a malformed edit payload.
//!
//! * [`PageError`] — **Non-fatal**: one page image failed to render or
//!   could not be written. Item extraction for that page still happens and
//!   the document carries on; failures are collected into
//!   [`crate::extract::ExtractOutput`] for a post-run report.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the lookbook-catalog library.
#[derive(Debug, Error)]
pub enum CatalogError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The configured PDF directory does not exist.
    #[error("PDF dir not found: '{path}'")]
    InputDirNotFound { path: PathBuf },

    /// The PDF directory exists but holds no `*.pdf` files.
    #[error("No PDFs found in: '{path}'")]
    NoPdfsFound { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The document could not be opened (corrupt, truncated, not a PDF).
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The document is encrypted; look books are expected to be open.
    #[error("PDF '{path}' is encrypted and requires a password")]
    PasswordRequired { path: PathBuf },

    /// Page index beyond the document's page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium could not produce the text layer for a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    /// pdfium returned an error while rasterising a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, place the library next to the binary, \
or install it system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Catalog errors ────────────────────────────────────────────────────
    /// A catalog or edit payload failed structural validation.
    #[error("Malformed catalog payload: {0}")]
    MalformedCatalog(String),

    /// A JSON file (catalog or category table) could not be parsed.
    #[error("Failed to parse '{path}': {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialising the catalog failed.
    #[error("Failed to serialise catalog: {0}")]
    Serialise(#[source] serde_json::Error),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other file-system failure tied to a path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A category table references an unknown category or is otherwise unusable.
    #[error("Invalid category table: {0}")]
    InvalidTaxonomy(String),
}

/// A non-fatal error for a single page image.
///
/// The page's items are still extracted; only the raster output is missing.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// pdfium failed to rasterise the page.
    #[error("{source_slug} page {page}: rasterisation failed: {detail}")]
    RenderFailed {
        source_slug: String,
        page: usize,
        detail: String,
    },

    /// The rendered image could not be encoded or written to disk.
    #[error("{source_slug} page {page}: could not write '{path}': {detail}")]
    ImageWriteFailed {
        source_slug: String,
        page: usize,
        path: String,
        detail: String,
    },
}

impl PageError {
    /// 1-based page number the failure belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. } | PageError::ImageWriteFailed { page, .. } => {
                *page
            }
        }
    }
}
