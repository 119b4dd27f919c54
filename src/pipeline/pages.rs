//! Page extraction: drive one look book page by page.
//!
//! For every page the raw text is merged into logical lines, headings are
//! rejected and the rest are categorised into [`Item`]s. Page images are
//! rendered alongside when enabled; render failures are recorded and the
//! document carries on.

use crate::catalog::{DocumentStats, Item, PageKey};
use crate::config::ExtractConfig;
use crate::error::{CatalogError, PageError};
use crate::pipeline::classify::Classifier;
use crate::pipeline::document::LookBook;
use crate::pipeline::merge::{merge_wrapped_lines, LineFilter};
use crate::pipeline::normalize::split_lines;
use crate::pipeline::render::{self, RenderOutcome};
use tracing::{debug, info};

/// Everything one document contributes to the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentExtraction {
    /// Items per page in page order. Pages without items are included with
    /// an empty list so callers can see every page.
    pub pages: Vec<(PageKey, Vec<Item>)>,
    pub stats: DocumentStats,
    pub render_errors: Vec<PageError>,
    pub images_rendered: usize,
    pub images_skipped: usize,
}

/// Items on one page of text, in the order they appear.
pub fn extract_page_items(text: &str, filter: &LineFilter, classifier: &Classifier) -> Vec<Item> {
    merge_wrapped_lines(split_lines(text), filter)
        .iter()
        .filter_map(|line| classifier.classify(line))
        .collect()
}

/// Walk every page of `book`, rendering images and extracting items.
///
/// Text failures are fatal for the document; image failures are not.
pub fn extract_document(
    book: &dyn LookBook,
    slug: &str,
    config: &ExtractConfig,
    classifier: &Classifier,
) -> Result<DocumentExtraction, CatalogError> {
    let filter = LineFilter::new(&config.taxonomy);
    let total_pages = book.page_count();
    let mut out = DocumentExtraction {
        pages: Vec::with_capacity(total_pages),
        ..Default::default()
    };

    if config.render_images {
        let dir = render::source_image_dir(&config.images_dir(), slug);
        std::fs::create_dir_all(&dir).map_err(|e| CatalogError::OutputWriteFailed {
            path: dir.clone(),
            source: e,
        })?;
    }

    for index in 0..total_pages {
        let page_num = index + 1;

        if config.render_images {
            match render::render_page_image(book, index, slug, config) {
                Ok(RenderOutcome::Rendered) => out.images_rendered += 1,
                Ok(RenderOutcome::Skipped) => out.images_skipped += 1,
                Err(e) => {
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_page_error(slug, page_num, total_pages, &e.to_string());
                    }
                    out.render_errors.push(e);
                }
            }
        }

        let text = book.page_text(index)?;
        let items = extract_page_items(&text, &filter, classifier);
        debug!("{} page {}: {} items", slug, page_num, items.len());

        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(slug, page_num, total_pages, items.len());
        }
        if !items.is_empty() {
            out.stats.pages_with_items += 1;
        }
        out.pages.push((PageKey::new(slug, page_num), items));
    }

    out.stats.pages_total = total_pages;
    info!(
        "{}: pages: {}  pages_with_items: {}  images rendered/skipped/failed: {}/{}/{}",
        slug,
        out.stats.pages_total,
        out.stats.pages_with_items,
        out.images_rendered,
        out.images_skipped,
        out.render_errors.len()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{Category, Taxonomy};

    #[test]
    fn page_text_to_items() {
        let taxonomy = Taxonomy::default();
        let filter = LineFilter::new(&taxonomy);
        let classifier = Classifier::new(&taxonomy);
        let text = "Brynn | Fall Looks\nGUCCI\nPologeorgis Shearling Coat\nin chestnut brown\n\
                    Chloe\nShort Sleeve Top\nDenim Shorts\n";
        let items = extract_page_items(text, &filter, &classifier);
        let got: Vec<(&str, Category)> = items.iter().map(|i| (i.name.as_str(), i.category)).collect();
        assert_eq!(
            got,
            vec![
                ("Pologeorgis Shearling Coat in chestnut brown", Category::Outerwear),
                ("Short Sleeve Top", Category::Tops),
                ("Denim Shorts", Category::Shorts),
            ]
        );
    }

    #[test]
    fn same_item_twice_on_a_page_is_kept_twice() {
        let taxonomy = Taxonomy::default();
        let items = extract_page_items(
            "Celine Belt\nCeline Belt",
            &LineFilter::new(&taxonomy),
            &Classifier::new(&taxonomy),
        );
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn empty_page_has_no_items() {
        let taxonomy = Taxonomy::default();
        let items = extract_page_items("", &LineFilter::new(&taxonomy), &Classifier::new(&taxonomy));
        assert!(items.is_empty());
    }
}
