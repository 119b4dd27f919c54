//! Pipeline stages for look-book extraction.
//!
//! Each submodule implements exactly one step. The text stages are pure
//! functions over strings and a [`crate::taxonomy::Taxonomy`], so they are
//! testable without a PDF library; only [`document`] and [`render`] touch
//! pdfium or the file system.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ document ──▶ normalize ──▶ merge ──▶ classify ──▶ pages
//! (slugs)    (pdfium)     (NFKC)        (wraps)   (category)   (+ render)
//! ```
//!
//! 1. [`source`]    — cover-page label and unique slug per document
//! 2. [`document`]  — page count, page text and rasters behind a trait
//! 3. [`normalize`] — Unicode/punctuation canonicalisation of raw lines
//! 4. [`merge`]     — rebuild wrapped item lines, drop page furniture
//! 5. [`classify`]  — reject headings, assign categories by token phrases
//! 6. [`pages`]     — drive one document page by page; [`render`] writes
//!    the page images

pub mod classify;
pub mod document;
pub mod merge;
pub mod normalize;
pub mod pages;
pub mod render;
pub mod source;
