//! Line merging: rebuild logical item entries from wrapped PDF lines.
//!
//! Look books list one item per entry, always starting with a capitalised
//! word (usually the designer). Long entries wrap onto following visual
//! lines, and those continuations start lowercase or with punctuation. The
//! merger folds continuations into the entry they belong to and drops page
//! furniture (banners, section boilerplate, season/year titles).
//!
//! Heading detection is *not* done here; see [`crate::pipeline::classify`].

use crate::pipeline::normalize::{clean_line, collapse_whitespace};
use crate::taxonomy::Taxonomy;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

static RE_SEASON_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(spring|summer|fall|winter).*\d{4}$").unwrap());

/// Characters that mark a line as the tail of the previous entry.
const CONTINUATION_PUNCTUATION: &[char] = &[',', '.', ';', ':', '/', '\\', ')', ']', '"', '\'', '-'];

/// Banner and boilerplate rules shared by the merger and the label picker.
///
/// Matching is case-insensitive whatever the case of the taxonomy's
/// strings; they are lowercased once here.
#[derive(Debug, Clone)]
pub struct LineFilter {
    banner_prefix: String,
    ignore_substrings: Vec<String>,
}

impl LineFilter {
    pub fn new(taxonomy: &Taxonomy) -> Self {
        Self {
            banner_prefix: taxonomy.banner_prefix.trim().to_lowercase(),
            ignore_substrings: taxonomy
                .ignore_substrings
                .iter()
                .map(|s| s.to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// True for the running banner or any configured boilerplate line.
    pub fn is_boilerplate(&self, line: &str) -> bool {
        let low = line.to_lowercase();
        if !self.banner_prefix.is_empty() && low.starts_with(&self.banner_prefix) {
            return true;
        }
        self.ignore_substrings.iter().any(|s| low.contains(s.as_str()))
    }

    /// True for lines the merger drops outright. `line` must already be cleaned.
    pub fn should_ignore(&self, line: &str) -> bool {
        if line.is_empty() || self.is_boilerplate(line) {
            return true;
        }
        // Cover pages repeat the season title, e.g. "Fall 2023".
        RE_SEASON_TITLE.is_match(&line.to_lowercase())
    }
}

/// True when `line` continues the previous entry rather than starting one.
pub fn is_continuation(line: &str) -> bool {
    match line.chars().next() {
        Some(c) => c.is_ascii_lowercase() || CONTINUATION_PUNCTUATION.contains(&c),
        None => false,
    }
}

/// Fold the raw lines of one page into logical item strings.
///
/// Lines are cleaned, boilerplate is dropped, and continuations are joined
/// onto the running entry with a single space. Output order is page order.
pub fn merge_wrapped_lines<'l>(
    lines: impl IntoIterator<Item = &'l str>,
    filter: &LineFilter,
) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for raw in lines {
        let line = clean_line(raw);
        if filter.should_ignore(&line) {
            continue;
        }

        if let Some(acc) = current.as_mut() {
            if is_continuation(&line) {
                trace!(continuation = %line, "merging wrapped line");
                acc.push(' ');
                acc.push_str(&line);
                continue;
            }
        }
        if let Some(done) = current.replace(line) {
            entries.push(done);
        }
    }
    entries.extend(current);

    entries
        .into_iter()
        .map(|e| collapse_whitespace(&e))
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(lines: &[&str]) -> Vec<String> {
        let taxonomy = Taxonomy::default();
        merge_wrapped_lines(lines.iter().copied(), &LineFilter::new(&taxonomy))
    }

    #[test]
    fn lowercase_line_continues_previous() {
        assert_eq!(
            merge(&["Pologeorgis Shearling Coat", "in chestnut brown"]),
            vec!["Pologeorgis Shearling Coat in chestnut brown"]
        );
    }

    #[test]
    fn punctuation_line_continues_previous() {
        assert_eq!(
            merge(&["Toteme Wool Scarf", ", oat melange", "(Also in navy", ") and grey"]),
            vec!["Toteme Wool Scarf , oat melange", "(Also in navy ) and grey"]
        );
    }

    #[test]
    fn capitalised_line_starts_new_entry() {
        assert_eq!(
            merge(&["Khaite Danielle Jean", "Loewe Puzzle Bag"]),
            vec!["Khaite Danielle Jean", "Loewe Puzzle Bag"]
        );
    }

    #[test]
    fn drops_banner_boilerplate_and_season_titles() {
        assert_eq!(
            merge(&[
                "Brynn | Winter Edit",
                "Fall/Winter Looks",
                "Fall 2023",
                "",
                "   ",
                "| Gabriela Hearst Cashmere Sweater |",
            ]),
            vec!["Gabriela Hearst Cashmere Sweater"]
        );
    }

    #[test]
    fn first_line_opens_entry_even_when_lowercase() {
        assert_eq!(merge(&["and more", "Celine Belt"]), vec!["and more", "Celine Belt"]);
    }

    #[test]
    fn season_rule_needs_trailing_year() {
        let taxonomy = Taxonomy::default();
        let filter = LineFilter::new(&taxonomy);
        assert!(filter.should_ignore("Winter Holiday 2025"));
        assert!(!filter.should_ignore("Summer Linen Shirt"));
    }

    #[test]
    fn hand_built_taxonomy_matches_banner_in_any_case() {
        let taxonomy = Taxonomy {
            banner_prefix: "Brynn |".to_string(),
            ignore_substrings: vec!["Resort LOOKS".to_string()],
            ..Taxonomy::default()
        };
        let filter = LineFilter::new(&taxonomy);
        assert!(filter.is_boilerplate("BRYNN | Cover"));
        assert!(filter.is_boilerplate("brynn | page two"));
        assert!(filter.is_boilerplate("All resort looks"));
        assert_eq!(
            merge_wrapped_lines(["Brynn | Looks", "Celine Belt"], &filter),
            vec!["Celine Belt"]
        );
    }

    #[test]
    fn continuation_detection() {
        assert!(is_continuation("in black"));
        assert!(is_continuation("- ivory"));
        assert!(!is_continuation("The Row"));
        assert!(!is_continuation("2024"));
        assert!(!is_continuation(""));
    }
}
