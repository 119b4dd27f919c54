//! Run orchestration: PDF folder in, page images and `collections.json` out.
//!
//! A run is strictly sequential: clean old outputs if asked, discover
//! look books, resolve a label and unique slug for each (in file-name
//! order), walk every document page by page, fold the results into one [`Catalog`] and write it atomically.
//! The catalog is rebuilt from scratch every time; nothing is merged with
//! a previous run's output.

use crate::catalog::{self, Catalog, CatalogBuilder, SourceEntry};
use crate::config::ExtractConfig;
use crate::error::{CatalogError, PageError};
use crate::pipeline::classify::Classifier;
use crate::pipeline::document::{BookOpener, PdfiumOpener};
use crate::pipeline::merge::LineFilter;
use crate::pipeline::pages;
use crate::pipeline::source::{self, SlugAllocator};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// A document left out of the catalog because it could not be read.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub slug: String,
    pub reason: String,
}

/// Result of a full extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOutput {
    pub catalog: Catalog,
    /// Where the catalog was written.
    pub catalog_path: PathBuf,
    /// Non-fatal page image failures, across all documents.
    pub render_errors: Vec<PageError>,
    /// Documents dropped under `keep_going`.
    pub skipped_documents: Vec<SkippedDocument>,
    pub images_rendered: usize,
    pub images_skipped: usize,
    pub duration_ms: u64,
}

/// Extract every look book in `config.pdf_dir` using pdfium.
///
/// # Errors
/// Returns `Err(CatalogError)` for fatal errors only:
/// - PDF directory missing or holding no PDFs
/// - pdfium cannot be bound
/// - a document cannot be opened (unless `keep_going` is set)
/// - the catalog cannot be written
pub fn extract(config: &ExtractConfig) -> Result<ExtractOutput, CatalogError> {
    // Fail on input problems before paying for the pdfium bind. A clean
    // run clears old outputs even for an empty folder, so it checks later.
    ensure_input_dir(&config.pdf_dir)?;
    if !config.clean {
        discover_pdfs(&config.pdf_dir)?;
    }
    let opener = PdfiumOpener::bind()?;
    extract_with(&opener, config)
}

/// Extract with an explicit document backend.
pub fn extract_with(
    opener: &dyn BookOpener,
    config: &ExtractConfig,
) -> Result<ExtractOutput, CatalogError> {
    let start = Instant::now();
    info!("Starting extraction: {}", config.pdf_dir.display());

    // ── Step 1: Clean previous outputs ───────────────────────────────────
    ensure_input_dir(&config.pdf_dir)?;
    if config.clean {
        clean_outputs(config)?;
    }

    // ── Step 2: Discover input, prepare output tree ──────────────────────
    let pdfs = discover_pdfs(&config.pdf_dir)?;
    info!("Found {} PDFs", pdfs.len());

    for dir in [config.images_dir(), config.data_dir()] {
        std::fs::create_dir_all(&dir).map_err(|e| CatalogError::OutputWriteFailed {
            path: dir.clone(),
            source: e,
        })?;
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(pdfs.len());
    }

    // ── Step 3: Resolve labels and slugs ─────────────────────────────────
    let sources = resolve_sources(opener, &pdfs, config);

    // ── Step 4: Extract pages ────────────────────────────────────────────
    let classifier = Classifier::new(&config.taxonomy);
    let mut builder = CatalogBuilder::new();
    let mut render_errors = Vec::new();
    let mut skipped_documents = Vec::new();
    let mut images_rendered = 0;
    let mut images_skipped = 0;

    for (path, source) in &sources {
        info!(
            "Processing {} -> {} ({})",
            file_name(path),
            source.slug,
            source.label
        );

        let extraction = opener.open(path).and_then(|book| {
            if let Some(ref cb) = config.progress_callback {
                cb.on_document_start(&source.slug, &source.label, book.page_count());
            }
            pages::extract_document(book.as_ref(), &source.slug, config, &classifier)
        });

        let extraction = match extraction {
            Ok(x) => x,
            Err(e) if config.keep_going => {
                warn!("Skipping {}: {}", path.display(), e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_skipped(&path.display().to_string(), &e.to_string());
                }
                skipped_documents.push(SkippedDocument {
                    path: path.clone(),
                    slug: source.slug.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            Err(e) => return Err(e),
        };

        if let Some(ref cb) = config.progress_callback {
            cb.on_document_complete(&source.slug, &extraction.stats);
        }

        builder.add_source(source.clone());
        builder.add_stats(&source.slug, extraction.stats);
        for (key, items) in extraction.pages {
            builder.add_page(key, items);
        }
        render_errors.extend(extraction.render_errors);
        images_rendered += extraction.images_rendered;
        images_skipped += extraction.images_skipped;
    }

    // ── Step 5: Build and persist the catalog ────────────────────────────
    let catalog = builder.build(&config.taxonomy);
    let catalog_path = config.catalog_path();
    catalog::write_catalog(&catalog_path, &catalog)?;
    info!("Wrote app data: {}", catalog_path.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(sources.len(), skipped_documents.len());
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Extraction complete: {} documents, {} item names, {}ms",
        sources.len() - skipped_documents.len(),
        catalog.all_index.len(),
        duration_ms
    );

    Ok(ExtractOutput {
        catalog,
        catalog_path,
        render_errors,
        skipped_documents,
        images_rendered,
        images_skipped,
        duration_ms,
    })
}

fn ensure_input_dir(dir: &Path) -> Result<(), CatalogError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(CatalogError::InputDirNotFound {
            path: dir.to_path_buf(),
        })
    }
}

/// Sorted `*.pdf` files directly inside `dir`.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    ensure_input_dir(dir)?;

    let entries = std::fs::read_dir(dir).map_err(|e| CatalogError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut pdfs = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| CatalogError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?
            .path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort();

    if pdfs.is_empty() {
        return Err(CatalogError::NoPdfsFound {
            path: dir.to_path_buf(),
        });
    }
    Ok(pdfs)
}

/// Remove the images tree and the catalog file from a previous run.
pub fn clean_outputs(config: &ExtractConfig) -> Result<(), CatalogError> {
    let images = config.images_dir();
    if images.exists() {
        debug!("Removing {}", images.display());
        std::fs::remove_dir_all(&images).map_err(|e| CatalogError::Io {
            path: images.clone(),
            source: e,
        })?;
    }

    let catalog = config.catalog_path();
    match std::fs::remove_file(&catalog) {
        Ok(()) => debug!("Removed {}", catalog.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(CatalogError::Io {
                path: catalog,
                source: e,
            })
        }
    }
    Ok(())
}

/// Label and slug for every document, in processing order.
///
/// A document whose cover page cannot be read falls back to its file name;
/// whether it can be extracted at all is decided later.
pub fn resolve_sources(
    opener: &dyn BookOpener,
    pdfs: &[PathBuf],
    config: &ExtractConfig,
) -> Vec<(PathBuf, SourceEntry)> {
    let filter = LineFilter::new(&config.taxonomy);
    let mut slugs = SlugAllocator::new();

    pdfs.iter()
        .map(|path| {
            let cover = read_cover_text(opener, path);
            let label = source::infer_label(&cover, path, &filter);
            let entry = slugs.resolve(label);
            debug!("{} -> {}", file_name(path), entry.slug);
            (path.clone(), entry)
        })
        .collect()
}

fn read_cover_text(opener: &dyn BookOpener, path: &Path) -> String {
    let text = opener.open(path).and_then(|book| {
        if book.page_count() == 0 {
            Ok(String::new())
        } else {
            book.page_text(0)
        }
    });
    text.unwrap_or_else(|e| {
        warn!("Could not read cover of {}: {}", path.display(), e);
        String::new()
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
