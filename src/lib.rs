//! # lookbook-catalog
//!
//! Turn a folder of PDF outfit look books into a searchable catalog of the
//! clothing items named on each page.
//!
//! ## What it produces
//!
//! Every page is rasterised to `images/<slug>/page_<n>.jpg` and its text is
//! parsed into item lines ("Pologeorgis Shearling Coat in chestnut brown"),
//! each classified into a category (Outerwear, Boots, Tops, …). The result
//! is one `data/collections.json` holding:
//!
//! - `all_items`: page key (`<slug>_page_<n>`) → items in reading order
//! - `all_index`: item name → every page it appears on
//! - per-source labels, image directories and page counts
//! - category display order and icons for a viewer
//!
//! ## Pipeline Overview
//!
//! ```text
//! pdfs/*.pdf
//!  │
//!  ├─ 1. Discover  sorted *.pdf files in the input folder
//!  ├─ 2. Source    cover-page label + unique slug per document
//!  ├─ 3. Render    pdfium raster → JPEG/PNG (skips existing files)
//!  ├─ 4. Parse     normalise, merge wrapped lines, drop headings
//!  ├─ 5. Classify  token-phrase rules, first match wins
//!  └─ 6. Catalog   inverted index + atomic JSON write
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lookbook_catalog::{extract, ExtractConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractConfig::builder()
//!         .pdf_dir("pdfs")
//!         .output_dir("site")
//!         .build()?;
//!     let output = extract(&config)?;
//!     eprintln!(
//!         "{} item names across {} sources",
//!         output.catalog.all_index.len(),
//!         output.catalog.source_labels.len()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `lookbook` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! lookbook-catalog = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime requirement
//!
//! Rendering and text extraction bind to a pdfium shared library at run
//! time. Set `PDFIUM_LIB_PATH` to the library file, or place it in the
//! working directory or a system library path.

// ── Modules ──────────────────────────────────────────────────────────────

mod atomic;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod progress;
pub mod taxonomy;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use catalog::{
    read_catalog, validate_payload, write_catalog, write_payload, Catalog, CatalogBuilder,
    DocumentStats, Item, PageKey, SourceEntry, CATALOG_FILE_NAME,
};
pub use config::{ExtractConfig, ExtractConfigBuilder, ImageFormat};
pub use error::{CatalogError, PageError};
pub use extract::{extract, extract_with, ExtractOutput, SkippedDocument};
pub use pipeline::document::{BookOpener, LookBook, PdfiumOpener};
pub use progress::{ExtractProgressCallback, NoopProgressCallback, ProgressCallback};
pub use taxonomy::{Category, Taxonomy};
