//! Source resolution: a display label and a unique slug per look book.
//!
//! The label is the first meaningful line of the cover page, falling back to
//! the file name. Slugs are path- and URL-safe and unique within a run;
//! collisions get `-2`, `-3`, … in processing order.

use crate::catalog::SourceEntry;
use crate::pipeline::merge::LineFilter;
use crate::pipeline::normalize::{normalize_text, split_lines};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Slug used when a label has no usable characters.
const FALLBACK_SLUG: &str = "pdf";

/// Pick a label from the first page's text, or fall back to the file stem.
pub fn infer_label(first_page_text: &str, pdf_path: &Path, filter: &LineFilter) -> String {
    let from_cover = split_lines(first_page_text)
        .map(|line| normalize_text(line.trim()).trim().to_string())
        .find(|line| !line.is_empty() && !filter.is_boilerplate(line));

    from_cover.unwrap_or_else(|| {
        let stem = pdf_path
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        normalize_text(&stem).trim().to_string()
    })
}

/// Lowercase, hyphen-separated `[a-z0-9]` slug for `label`.
pub fn slugify(label: &str) -> String {
    let text = normalize_text(label)
        .to_lowercase()
        .replace('&', "and")
        .replace('|', " ");

    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.trim().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Hands out unique slugs in the order sources are registered.
#[derive(Debug, Default)]
pub struct SlugAllocator {
    next_suffix: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `base` on first use, then `base-2`, `base-3`, …
    ///
    /// A suffixed slug is never handed out twice, even when another label
    /// slugifies to it directly.
    pub fn allocate(&mut self, base: &str) -> String {
        if self.issued.insert(base.to_string()) {
            return base.to_string();
        }
        let n = self.next_suffix.entry(base.to_string()).or_insert(2);
        loop {
            let candidate = format!("{base}-{n}");
            *n += 1;
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Resolve a label into a registered [`SourceEntry`].
    pub fn resolve(&mut self, label: String) -> SourceEntry {
        let slug = self.allocate(&slugify(&label));
        SourceEntry::new(slug, label)
    }
}
