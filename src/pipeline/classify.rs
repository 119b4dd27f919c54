//! Item classification: heading rejection and keyword categorisation.
//!
//! Categorisation is token-phrase matching, never substring matching:
//! "Pologeorgis" must not hit the "polo" keyword. Lines are lowercased,
//! split on every non-alphanumeric run, and each keyword phrase must appear
//! as a contiguous run of whole tokens.
//!
//! The decision is an ordered rule list evaluated until one fires:
//!
//! 1. [`Rule::VNeck`] — `vneck` or `v neck` anywhere is always a sweater.
//! 2. [`Rule::Silhouette`] — `mini`, `midi`, `pencil` are skirt shorthand.
//! 3. One [`Rule::Keywords`] per category, in the taxonomy's match order.
//!
//! No rule fires → [`Category::Other`].
//!
//! Heading detection consults the category, so a line is always categorised
//! first and the heading rules are applied to that result.

use crate::catalog::Item;
use crate::pipeline::normalize::{clean_line, normalize_text};
use crate::taxonomy::{Category, Taxonomy};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{4}\b").unwrap());

/// Headings without lowercase letters longer than this are kept as items.
const MAX_SHOUTED_HEADING_LEN: usize = 60;

const SILHOUETTE_WORDS: [&str; 3] = ["mini", "midi", "pencil"];

/// Lowercase alphanumeric tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize_text(text)
        .to_lowercase()
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && tokens.windows(phrase.len()).any(|w| w == phrase)
}

fn ends_with_phrase(tokens: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && tokens.ends_with(phrase)
}

/// A tokenised keyword phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    tokens: Vec<String>,
    /// Only matches as the last tokens of the line.
    end_anchored: bool,
}

impl Phrase {
    fn new(category: Category, raw: &str) -> Self {
        let tokens = tokenize(raw);
        // "short sleeve" is a top; only a trailing "short(s)" means shorts.
        let end_anchored = category == Category::Shorts
            && tokens.len() == 1
            && matches!(tokens[0].as_str(), "short" | "shorts");
        Self {
            tokens,
            end_anchored,
        }
    }

    fn matches(&self, tokens: &[String]) -> bool {
        if self.end_anchored {
            ends_with_phrase(tokens, &self.tokens)
        } else {
            contains_phrase(tokens, &self.tokens)
        }
    }
}

/// One step of the categorisation decision list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    VNeck,
    Silhouette,
    Keywords {
        category: Category,
        phrases: Vec<Phrase>,
    },
}

impl Rule {
    /// The category this rule assigns to `tokens`, if it fires.
    pub fn fire(&self, tokens: &[String]) -> Option<Category> {
        let fired = match self {
            Rule::VNeck => {
                tokens.iter().any(|t| t == "vneck")
                    || tokens.windows(2).any(|w| w[0] == "v" && w[1] == "neck")
            }
            Rule::Silhouette => tokens
                .iter()
                .any(|t| SILHOUETTE_WORDS.contains(&t.as_str())),
            Rule::Keywords { phrases, .. } => phrases.iter().any(|p| p.matches(tokens)),
        };
        fired.then(|| self.category())
    }

    pub fn category(&self) -> Category {
        match self {
            Rule::VNeck => Category::Sweaters,
            Rule::Silhouette => Category::Skirts,
            Rule::Keywords { category, .. } => *category,
        }
    }
}

/// Categoriser and heading filter built once from a [`Taxonomy`].
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    pub fn new(taxonomy: &Taxonomy) -> Self {
        let mut rules = vec![Rule::VNeck, Rule::Silhouette];
        rules.extend(taxonomy.match_order.iter().map(|&category| Rule::Keywords {
            category,
            phrases: taxonomy
                .phrases(category)
                .iter()
                .map(|raw| Phrase::new(category, raw))
                .collect(),
        }));
        Self { rules }
    }

    /// The decision list, overrides first.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Category of a free-text item line.
    pub fn categorize(&self, line: &str) -> Category {
        let tokens = tokenize(line);
        self.rules
            .iter()
            .find_map(|rule| rule.fire(&tokens))
            .unwrap_or(Category::Other)
    }

    /// True when `line` is a section label, title or brand heading rather
    /// than an item.
    pub fn is_heading(&self, line: &str) -> bool {
        let cleaned = clean_line(line);
        if cleaned.is_empty() {
            return true;
        }
        let category = self.categorize(&cleaned);
        heading_given_category(&cleaned, category)
    }

    /// Turn a merged line into an [`Item`], or `None` if it is a heading.
    pub fn classify(&self, line: &str) -> Option<Item> {
        let name = clean_line(line);
        if name.is_empty() {
            return None;
        }
        let category = self.categorize(&name);
        if heading_given_category(&name, category) {
            return None;
        }
        Some(Item { name, category })
    }
}

fn heading_given_category(line: &str, category: Category) -> bool {
    // Section labels like "SHORTS" or "DENIM".
    if !line.chars().any(|c| c.is_ascii_lowercase())
        && line.chars().count() <= MAX_SHOUTED_HEADING_LEN
    {
        return true;
    }

    // Cover titles such as "Valentine's Day Edit 2026".
    if RE_YEAR.is_match(line) && category == Category::Other {
        return true;
    }

    // Brand headings such as "Chloe" or "Phoebe Philo".
    let words = line.split_whitespace().count();
    (1..=2).contains(&words) && is_title_case(line) && category == Category::Other
}

/// Title case: every cased run starts uppercase and continues lowercase,
/// with at least one cased character.
fn is_title_case(s: &str) -> bool {
    let mut any_cased = false;
    let mut prev_cased = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            any_cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            any_cased = true;
        } else {
            prev_cased = false;
        }
    }
    any_cased
}
