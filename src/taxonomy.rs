//! Categories and the keyword tables that drive classification.
//!
//! The tables are data, not behaviour: changing a keyword list or the match
//! precedence changes how lines are classified without touching code. The
//! built-in [`Taxonomy::default`] carries the tables the look books were
//! tuned against; [`Taxonomy::from_file`] loads a replacement from JSON with
//! the same shape that [`Taxonomy::to_json_pretty`] prints.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The closed set of item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Shorts,
    Bottoms,
    Skirts,
    Dresses,
    Sweaters,
    Tops,
    Outerwear,
    Boots,
    Footwear,
    Bags,
    Accessories,
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 12] = [
        Category::Shorts,
        Category::Bottoms,
        Category::Skirts,
        Category::Dresses,
        Category::Sweaters,
        Category::Tops,
        Category::Outerwear,
        Category::Boots,
        Category::Footwear,
        Category::Bags,
        Category::Accessories,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Shorts => "Shorts",
            Category::Bottoms => "Bottoms",
            Category::Skirts => "Skirts",
            Category::Dresses => "Dresses",
            Category::Sweaters => "Sweaters",
            Category::Tops => "Tops",
            Category::Outerwear => "Outerwear",
            Category::Boots => "Boots",
            Category::Footwear => "Footwear",
            Category::Bags => "Bags",
            Category::Accessories => "Accessories",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CatalogError::InvalidTaxonomy(format!("unknown category '{s}'")))
    }
}

/// Keyword tables, ordering and display metadata for classification.
///
/// `match_order` is the precedence used when scanning keywords and is
/// deliberately distinct from `category_order`, which only drives display.
#[derive(Debug, Clone, PartialEq)]
pub struct Taxonomy {
    /// Keyword phrases per category, each phrase matched as a token sequence.
    pub keywords: BTreeMap<Category, Vec<String>>,
    /// Categories scanned for keyword hits, first hit wins.
    pub match_order: Vec<Category>,
    /// Display orderings keyed by collection name (usually just `"all"`).
    pub category_order: BTreeMap<String, Vec<Category>>,
    /// Display icon per category.
    pub category_icons: BTreeMap<Category, String>,
    /// Prefix of the running page banner, e.g. `"brynn |"`; case-insensitive.
    pub banner_prefix: String,
    /// Case-insensitive substrings that mark a line as boilerplate.
    pub ignore_substrings: Vec<String>,
}

/// On-disk shape of a [`Taxonomy`]; category names are plain strings so
/// unknown names can be reported instead of failing deep inside serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaxonomyFile {
    keywords: BTreeMap<String, Vec<String>>,
    match_order: Vec<String>,
    category_order: BTreeMap<String, Vec<String>>,
    category_icons: BTreeMap<String, String>,
    #[serde(default)]
    banner_prefix: String,
    #[serde(default)]
    ignore_substrings: Vec<String>,
}

impl Taxonomy {
    /// Load a category table from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: TaxonomyFile =
            serde_json::from_str(&raw).map_err(|e| CatalogError::ParseFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::try_from(file)
    }

    /// Parse a category table from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: TaxonomyFile = serde_json::from_str(raw)
            .map_err(|e| CatalogError::InvalidTaxonomy(e.to_string()))?;
        Self::try_from(file)
    }

    /// Pretty JSON in the format [`Taxonomy::from_file`] accepts.
    pub fn to_json_pretty(&self) -> Result<String, CatalogError> {
        serde_json::to_string_pretty(&TaxonomyFile::from(self)).map_err(CatalogError::Serialise)
    }

    /// Keyword phrases for `category`, empty when the table has none.
    pub fn phrases(&self, category: Category) -> &[String] {
        self.keywords
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Display order as plain names, for the catalog's pass-through metadata.
    pub fn display_order(&self) -> BTreeMap<String, Vec<String>> {
        self.category_order
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().map(|c| c.to_string()).collect()))
            .collect()
    }

    /// Icons keyed by category name.
    pub fn display_icons(&self) -> BTreeMap<String, String> {
        self.category_icons
            .iter()
            .map(|(c, icon)| (c.to_string(), icon.clone()))
            .collect()
    }
}

fn parse_categories(names: &[String]) -> Result<Vec<Category>, CatalogError> {
    names.iter().map(|n| n.parse()).collect()
}

impl TryFrom<TaxonomyFile> for Taxonomy {
    type Error = CatalogError;

    fn try_from(file: TaxonomyFile) -> Result<Self, Self::Error> {
        let mut keywords = BTreeMap::new();
        for (name, phrases) in file.keywords {
            let category: Category = name.parse()?;
            if category == Category::Other {
                return Err(CatalogError::InvalidTaxonomy(
                    "'Other' is the fallback and cannot have keywords".into(),
                ));
            }
            keywords.insert(category, phrases);
        }

        let match_order = parse_categories(&file.match_order)?;
        let mut seen = Vec::with_capacity(match_order.len());
        for c in &match_order {
            if seen.contains(c) {
                return Err(CatalogError::InvalidTaxonomy(format!(
                    "'{c}' appears twice in match_order"
                )));
            }
            seen.push(*c);
        }

        let mut category_order = BTreeMap::new();
        for (collection, names) in file.category_order {
            category_order.insert(collection, parse_categories(&names)?);
        }

        let mut category_icons = BTreeMap::new();
        for (name, icon) in file.category_icons {
            category_icons.insert(name.parse()?, icon);
        }

        Ok(Taxonomy {
            keywords,
            match_order,
            category_order,
            category_icons,
            banner_prefix: file.banner_prefix.to_lowercase(),
            ignore_substrings: file.ignore_substrings,
        })
    }
}

impl From<&Taxonomy> for TaxonomyFile {
    fn from(t: &Taxonomy) -> Self {
        TaxonomyFile {
            keywords: t
                .keywords
                .iter()
                .map(|(c, v)| (c.to_string(), v.clone()))
                .collect(),
            match_order: t.match_order.iter().map(|c| c.to_string()).collect(),
            category_order: t.display_order(),
            category_icons: t.display_icons(),
            banner_prefix: t.banner_prefix.clone(),
            ignore_substrings: t.ignore_substrings.clone(),
        }
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for Taxonomy {
    fn default() -> Self {
        use Category::*;

        let keywords = BTreeMap::from([
            (Shorts, owned(&["shorts", "short"])),
            (
                Sweaters,
                owned(&["sweater", "sweaters", "crew", "crewneck", "v neck", "vneck"]),
            ),
            (Boots, owned(&["boot", "boots", "bootie", "booties"])),
            (
                Bottoms,
                owned(&[
                    "trouser", "pant", "jean", "denim", "legging", "tight", "tights", "skort",
                    "capri",
                ]),
            ),
            (
                Skirts,
                // Many skirt entries read "<brand> ... mini" without the word "skirt".
                owned(&["skirt", "mini skirt", "midi skirt", "maxi skirt", "mini"]),
            ),
            (
                Dresses,
                owned(&["dress", "gown", "set", "jumpsuit", "romper"]),
            ),
            (
                Tops,
                owned(&[
                    "top", "tank", "tee", "t-shirt", "shirt", "blouse", "hoodie", "polo",
                    "cardigan", "knit", "pullover", "turtleneck", "bodysuit", "camisole",
                ]),
            ),
            (
                Outerwear,
                owned(&[
                    "coat", "jacket", "blazer", "trench", "shearling", "bomber", "parka", "cape",
                    "poncho", "raincoat",
                    // Fur descriptors that show up without "coat" or "jacket".
                    "mink", "sable", "fur", "sheared", "palomino", "chevron",
                ]),
            ),
            (
                Footwear,
                owned(&[
                    "shoe", "loafer", "heel", "flat", "slingback", "mule", "sandal", "pump",
                    "ballet", "boat shoe", "thong", "slipper", "sneaker",
                ]),
            ),
            (
                Bags,
                owned(&[
                    "bag", "tote", "clutch", "kelly", "birkin", "pochette", "purse", "pouch",
                    "mini kelly", "backpack",
                ]),
            ),
            (
                Accessories,
                owned(&[
                    "belt", "scarf", "hat", "beanie", "sunglasses", "earring", "necklace",
                    "bracelet", "ring", "brooch", "watch", "glove",
                ]),
            ),
        ]);

        let category_icons = BTreeMap::from([
            (Outerwear, "🧥".to_string()),
            (Sweaters, "🧶".to_string()),
            (Tops, "👚".to_string()),
            (Bottoms, "👖".to_string()),
            (Shorts, "🩳".to_string()),
            (Skirts, "👗".to_string()),
            (Dresses, "💃".to_string()),
            (Boots, "👢".to_string()),
            (Footwear, "👠".to_string()),
            (Bags, "👜".to_string()),
            (Accessories, "🧣".to_string()),
            (Other, "📦".to_string()),
        ]);

        Taxonomy {
            keywords,
            match_order: vec![
                Boots, Footwear, Bags, Outerwear, Dresses, Skirts, Shorts, Bottoms, Sweaters,
                Tops, Accessories,
            ],
            category_order: BTreeMap::from([("all".to_string(), Category::ALL.to_vec())]),
            category_icons,
            banner_prefix: "brynn |".to_string(),
            ignore_substrings: owned(&["Fall/Winter Looks", "Spring/Summer Looks"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_parse_back() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
        assert!("Hats".parse::<Category>().is_err());
    }

    #[test]
    fn default_match_order_excludes_other() {
        let t = Taxonomy::default();
        assert_eq!(t.match_order.len(), 11);
        assert!(!t.match_order.contains(&Category::Other));
        assert_eq!(t.match_order[0], Category::Boots);
    }

    #[test]
    fn display_order_is_distinct_from_match_order() {
        let t = Taxonomy::default();
        let all = &t.category_order["all"];
        assert_eq!(all.first(), Some(&Category::Shorts));
        assert_eq!(all.last(), Some(&Category::Other));
    }

    #[test]
    fn json_round_trip_preserves_tables() {
        let t = Taxonomy::default();
        let json = t.to_json_pretty().unwrap();
        let back = Taxonomy::from_json(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let raw = r#"{
            "keywords": {"Hats": ["fedora"]},
            "match_order": [],
            "category_order": {},
            "category_icons": {}
        }"#;
        let err = Taxonomy::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("Hats"), "got: {err}");
    }

    #[test]
    fn duplicate_match_order_is_rejected() {
        let raw = r#"{
            "keywords": {},
            "match_order": ["Tops", "Tops"],
            "category_order": {},
            "category_icons": {}
        }"#;
        assert!(Taxonomy::from_json(raw).is_err());
    }
}
