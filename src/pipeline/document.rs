//! Document backend: page count, page text and page rasters.
//!
//! The extraction pipeline only needs three capabilities from a PDF
//! library, captured by [`LookBook`]. [`BookOpener`] turns a path into a
//! `LookBook`. The production implementation is pdfium via
//! `pdfium-render`; tests plug in an in-memory book.

use crate::error::CatalogError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An opened look book.
pub trait LookBook {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Plain text of the page at 0-based `index`, lines separated by newlines.
    fn page_text(&self, index: usize) -> Result<String, CatalogError>;

    /// Rasterise the page at 0-based `index`, scaled by `scale`.
    fn render_page(&self, index: usize, scale: f32) -> Result<DynamicImage, CatalogError>;
}

/// Opens look books from the file system.
pub trait BookOpener {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn LookBook + 'a>, CatalogError>;
}

/// Bind to a pdfium library.
///
/// Searches, in order: `PDFIUM_LIB_PATH` (path to the library file), the
/// current directory, then the system library paths.
pub fn bind_pdfium() -> Result<Pdfium, CatalogError> {
    let bindings = match std::env::var_os("PDFIUM_LIB_PATH") {
        Some(path) => Pdfium::bind_to_library(PathBuf::from(path)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| CatalogError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// [`BookOpener`] backed by pdfium.
pub struct PdfiumOpener {
    pdfium: Pdfium,
}

impl PdfiumOpener {
    pub fn new(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }

    /// Bind pdfium with [`bind_pdfium`] and wrap it.
    pub fn bind() -> Result<Self, CatalogError> {
        bind_pdfium().map(Self::new)
    }
}

impl BookOpener for PdfiumOpener {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn LookBook + 'a>, CatalogError> {
        let document = self.pdfium.load_pdf_from_file(path, None).map_err(|e| {
            let detail = format!("{:?}", e);
            if detail.contains("Password") || detail.contains("password") {
                CatalogError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            } else {
                CatalogError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail,
                }
            }
        })?;
        debug!(path = %path.display(), pages = document.pages().len(), "opened PDF");
        Ok(Box::new(PdfiumBook { document }))
    }
}

/// A PDF opened through pdfium.
pub struct PdfiumBook<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumBook<'a> {
    fn page(&self, index: usize) -> Result<PdfPage<'a>, CatalogError> {
        let total = self.page_count();
        let out_of_range = || CatalogError::PageOutOfRange {
            page: index + 1,
            total,
        };
        if index >= total {
            return Err(out_of_range());
        }
        let idx = u16::try_from(index).map_err(|_| out_of_range())?;
        self.document
            .pages()
            .get(idx)
            .map_err(|e| CatalogError::TextExtractionFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })
    }
}

impl LookBook for PdfiumBook<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_text(&self, index: usize) -> Result<String, CatalogError> {
        let page = self.page(index)?;
        let text = page
            .text()
            .map_err(|e| CatalogError::TextExtractionFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })?;
        Ok(text.all())
    }

    fn render_page(&self, index: usize, scale: f32) -> Result<DynamicImage, CatalogError> {
        let page = self.page(index)?;
        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            CatalogError::RasterisationFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            }
        })?;
        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}
