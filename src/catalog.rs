//! The catalog: the single persisted artefact of an extraction run.
//!
//! [`CatalogBuilder`] folds per-document page items into a [`Catalog`]:
//! items keyed by [`PageKey`], an inverted name → pages index (deduplicated,
//! sorted by source then numeric page), source labels and image folders,
//! and per-source stats. The catalog is rebuilt from scratch on each run.
//!
//! Persistence writes pretty JSON with a trailing newline through a temp
//! file in the target directory and an atomic rename, so a static server
//! reading `collections.json` never sees a torn file.

use crate::error::CatalogError;
use crate::taxonomy::{Category, Taxonomy};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// File name of the catalog inside the data directory.
pub const CATALOG_FILE_NAME: &str = "collections.json";

/// One garment or accessory entry found on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub category: Category,
}

/// `"<source-slug>_page_<n>"`, ordered by slug then numeric page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageKey {
    pub source: String,
    pub page: usize,
}

impl PageKey {
    pub fn new(source: impl Into<String>, page: usize) -> Self {
        Self {
            source: source.into(),
            page,
        }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_page_{}", self.source, self.page)
    }
}

impl FromStr for PageKey {
    type Err = CatalogError;

    /// Slugs never contain `_`, so the first underscore ends the source.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CatalogError::MalformedCatalog(format!("invalid page key '{s}'"));
        let (source, rest) = s.split_once('_').ok_or_else(bad)?;
        let page = rest
            .strip_prefix("page_")
            .and_then(|n| n.parse().ok())
            .ok_or_else(bad)?;
        Ok(Self::new(source, page))
    }
}

impl Serialize for PageKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PageKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// A resolved input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub slug: String,
    pub label: String,
    pub image_path: String,
}

impl SourceEntry {
    /// Entry whose page images live under `images/<slug>`.
    pub fn new(slug: impl Into<String>, label: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            image_path: format!("images/{slug}"),
            label: label.into(),
            slug,
        }
    }
}

/// Page counts for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub pages_total: usize,
    pub pages_with_items: usize,
}

/// The complete output of one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub all_index: BTreeMap<String, Vec<PageKey>>,
    pub all_items: BTreeMap<PageKey, Vec<Item>>,
    pub source_image_paths: BTreeMap<String, String>,
    pub source_labels: BTreeMap<String, String>,
    pub category_order: BTreeMap<String, Vec<String>>,
    pub category_icons: BTreeMap<String, String>,
    pub edit_mode_enabled: bool,
    pub stats_by_source: BTreeMap<String, DocumentStats>,
}

/// Accumulates sources and page items, then produces one [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    sources: Vec<SourceEntry>,
    pages: BTreeMap<PageKey, Vec<Item>>,
    stats: BTreeMap<String, DocumentStats>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolved source document.
    pub fn add_source(&mut self, source: SourceEntry) -> &mut Self {
        self.sources.push(source);
        self
    }

    /// Record the items of one page. Pages without items are not keyed.
    pub fn add_page(&mut self, key: PageKey, items: Vec<Item>) -> &mut Self {
        if !items.is_empty() {
            self.pages.insert(key, items);
        }
        self
    }

    /// Record page counts for a source.
    pub fn add_stats(&mut self, slug: impl Into<String>, stats: DocumentStats) -> &mut Self {
        self.stats.insert(slug.into(), stats);
        self
    }

    /// Fold everything into the final catalog.
    pub fn build(self, taxonomy: &Taxonomy) -> Catalog {
        let all_index = build_index(&self.pages);
        debug!(
            names = all_index.len(),
            pages = self.pages.len(),
            "built inverted index"
        );

        let mut source_image_paths = BTreeMap::new();
        let mut source_labels = BTreeMap::new();
        for source in self.sources {
            source_image_paths.insert(source.slug.clone(), source.image_path);
            source_labels.insert(source.slug, source.label);
        }

        Catalog {
            all_index,
            all_items: self.pages,
            source_image_paths,
            source_labels,
            category_order: taxonomy.display_order(),
            category_icons: taxonomy.display_icons(),
            edit_mode_enabled: false,
            stats_by_source: self.stats,
        }
    }
}

/// Invert page → items into name → pages, deduplicated and sorted.
pub fn build_index(pages: &BTreeMap<PageKey, Vec<Item>>) -> BTreeMap<String, Vec<PageKey>> {
    let mut index: BTreeMap<String, Vec<PageKey>> = BTreeMap::new();
    for (key, items) in pages {
        for item in items {
            let name = item.name.trim();
            if name.is_empty() {
                continue;
            }
            index.entry(name.to_string()).or_default().push(key.clone());
        }
    }
    for keys in index.values_mut() {
        keys.sort();
        keys.dedup();
    }
    index
}

// ── Persistence ──────────────────────────────────────────────────────────

/// Serialise `value` as pretty JSON with a trailing newline and atomically
/// replace `path` with it.
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CatalogError> {
    let write_err = |source: std::io::Error| CatalogError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut body = serde_json::to_string_pretty(value).map_err(CatalogError::Serialise)?;
    body.push('\n');

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = crate::atomic::output_temp_file(dir).map_err(write_err)?;
    tmp.write_all(body.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!(path = %path.display(), bytes = body.len(), "wrote json");
    Ok(())
}

/// Write the catalog to `path` (pretty JSON, trailing newline, atomic replace).
pub fn write_catalog(path: impl AsRef<Path>, catalog: &Catalog) -> Result<(), CatalogError> {
    write_json_atomic(path.as_ref(), catalog)
}

/// Read a catalog previously written by [`write_catalog`].
pub fn read_catalog(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&raw).map_err(|e| CatalogError::ParseFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Structural check for an edited catalog payload.
///
/// The payload must be a JSON object whose `all_index` and `all_items` are
/// objects. Anything else is rejected before any write happens.
pub fn validate_payload(payload: &serde_json::Value) -> Result<(), CatalogError> {
    let obj = payload.as_object().ok_or_else(|| {
        CatalogError::MalformedCatalog("payload must be a JSON object".into())
    })?;
    for key in ["all_index", "all_items"] {
        match obj.get(key) {
            Some(v) if v.is_object() => {}
            Some(_) => {
                return Err(CatalogError::MalformedCatalog(format!(
                    "'{key}' must be an object"
                )))
            }
            None => {
                return Err(CatalogError::MalformedCatalog(format!(
                    "missing required key '{key}'"
                )))
            }
        }
    }
    Ok(())
}

/// Validate an edited payload, then atomically replace the catalog file.
///
/// The whole file is replaced; nothing is merged with what was there.
pub fn write_payload(
    path: impl AsRef<Path>,
    payload: &serde_json::Value,
) -> Result<(), CatalogError> {
    validate_payload(payload)?;
    write_json_atomic(path.as_ref(), payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(name: &str, category: Category) -> Item {
        Item {
            name: name.into(),
            category,
        }
    }

    #[test]
    fn page_key_format_and_parse() {
        let key = PageKey::new("spring-looks-2", 14);
        assert_eq!(key.to_string(), "spring-looks-2_page_14");
        assert_eq!("spring-looks-2_page_14".parse::<PageKey>().unwrap(), key);
        assert!("nounderscore".parse::<PageKey>().is_err());
        assert!("a_sheet_3".parse::<PageKey>().is_err());
        assert!("a_page_x".parse::<PageKey>().is_err());
    }

    #[test]
    fn page_keys_sort_numerically_within_source() {
        let mut keys = vec![
            PageKey::new("b", 1),
            PageKey::new("a", 10),
            PageKey::new("a", 2),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["a_page_2", "a_page_10", "b_page_1"]);
    }

    #[test]
    fn index_is_deduplicated_and_ordered() {
        let coat = item("Toteme Wool Coat", Category::Outerwear);
        let mut pages = BTreeMap::new();
        pages.insert(PageKey::new("b", 1), vec![coat.clone()]);
        pages.insert(PageKey::new("a", 10), vec![coat.clone()]);
        pages.insert(PageKey::new("a", 2), vec![coat.clone(), coat.clone()]);

        let index = build_index(&pages);
        let rendered: Vec<String> = index["Toteme Wool Coat"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered, vec!["a_page_2", "a_page_10", "b_page_1"]);
    }

    #[test]
    fn builder_skips_empty_pages_and_fills_metadata() {
        let mut b = CatalogBuilder::new();
        b.add_source(SourceEntry::new("resort", "Resort"))
            .add_page(PageKey::new("resort", 1), vec![])
            .add_page(
                PageKey::new("resort", 2),
                vec![item("Celine Belt", Category::Accessories)],
            )
            .add_stats(
                "resort",
                DocumentStats {
                    pages_total: 2,
                    pages_with_items: 1,
                },
            );
        let catalog = b.build(&Taxonomy::default());

        assert_eq!(catalog.all_items.len(), 1);
        assert_eq!(catalog.source_image_paths["resort"], "images/resort");
        assert_eq!(catalog.source_labels["resort"], "Resort");
        assert_eq!(catalog.category_order["all"].len(), 12);
        assert_eq!(catalog.category_icons["Other"], "📦");
        assert!(!catalog.edit_mode_enabled);
        for keys in catalog.all_index.values() {
            for key in keys {
                assert!(catalog.all_items.contains_key(key));
            }
        }
    }

    #[test]
    fn serialises_page_keys_as_strings() {
        let mut b = CatalogBuilder::new();
        b.add_page(
            PageKey::new("a", 3),
            vec![item("Loewe Puzzle Bag", Category::Bags)],
        );
        let value = serde_json::to_value(b.build(&Taxonomy::default())).unwrap();
        assert_eq!(value["all_index"]["Loewe Puzzle Bag"], json!(["a_page_3"]));
        assert_eq!(value["all_items"]["a_page_3"][0]["category"], json!("Bags"));
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join(CATALOG_FILE_NAME);
        let mut b = CatalogBuilder::new();
        b.add_source(SourceEntry::new("a", "Look Book A"))
            .add_page(
                PageKey::new("a", 1),
                vec![item("Khaite Danielle Jean", Category::Bottoms)],
            );
        let catalog = b.build(&Taxonomy::default());

        write_catalog(&path, &catalog).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.ends_with("}\n"));
        assert!(raw.contains("\n  \"all_index\""));
        assert!(raw.contains("🧥"), "non-ASCII must be written unescaped");
        assert_eq!(read_catalog(&path).unwrap(), catalog);
    }

    #[cfg(unix)]
    #[test]
    fn catalog_file_gets_normal_permissions() {
        use crate::atomic::tests::{mode, plain_write_mode};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CATALOG_FILE_NAME);
        write_catalog(&path, &CatalogBuilder::new().build(&Taxonomy::default())).unwrap();
        assert_eq!(mode(&path), plain_write_mode(dir.path()));

        write_payload(&path, &json!({"all_index": {}, "all_items": {}})).unwrap();
        assert_eq!(mode(&path), plain_write_mode(dir.path()));
    }

    #[test]
    fn payload_validation() {
        assert!(validate_payload(&json!({"all_index": {}, "all_items": {}})).is_ok());
        assert!(validate_payload(&json!([])).is_err());
        assert!(validate_payload(&json!({"all_index": {}})).is_err());
        assert!(validate_payload(&json!({"all_index": [], "all_items": {}})).is_err());
    }

    #[test]
    fn invalid_payload_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CATALOG_FILE_NAME);
        std::fs::write(&path, "original\n").unwrap();

        let err = write_payload(&path, &json!({"all_items": {}})).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedCatalog(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original\n");

        write_payload(&path, &json!({"all_index": {}, "all_items": {}, "extra": 1})).unwrap();
        let back: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back["extra"], json!(1));
    }
}
