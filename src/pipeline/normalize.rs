//! Text canonicalisation for raw PDF text lines.
//!
//! pdfium hands back whatever glyphs the look book used: ligatures,
//! full-width forms, curly quotes, en/em dashes. Everything downstream
//! (line merging, tokenising, slugging) works on the NFKC form with the
//! common typographic punctuation folded to ASCII.

use unicode_normalization::UnicodeNormalization;

/// NFKC-normalise `text` and fold curly quotes and dashes to ASCII.
///
/// Total: returns the input unchanged when there is nothing to fold,
/// including for the empty string.
pub fn normalize_text(text: &str) -> String {
    text.nfkc()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect()
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalise, collapse whitespace and strip stray `|` separators.
pub fn clean_line(line: &str) -> String {
    let collapsed = collapse_whitespace(&normalize_text(line));
    collapsed.trim_matches('|').trim().to_string()
}

/// Split a page text blob into raw lines.
///
/// Accepts every line break pdfium or a text layer may produce (`\r\n`,
/// lone `\r`, form feeds, Unicode line/paragraph separators). Empty pieces
/// are kept; the merger drops them.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c| {
        matches!(
            c,
            '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{1C}' | '\u{1D}' | '\u{1E}' | '\u{85}'
                | '\u{2028}' | '\u{2029}'
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_quotes_and_dashes() {
        assert_eq!(
            normalize_text("Saint Laurent \u{2018}Le 5\u{2019}7\u{2019} \u{201C}bag\u{201D} \u{2013} black\u{2014}gold"),
            "Saint Laurent 'Le 5'7' \"bag\" - black-gold"
        );
    }

    #[test]
    fn applies_compatibility_forms() {
        // U+FB01 LATIN SMALL LIGATURE FI, full-width A
        assert_eq!(normalize_text("\u{FB01}ne \u{FF21}"), "fine A");
    }

    #[test]
    fn empty_and_plain_are_identity() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("Wool Coat"), "Wool Coat");
    }

    #[test]
    fn clean_line_strips_pipes_and_spaces() {
        assert_eq!(clean_line("  | Khaite   Danielle  Jean |  "), "Khaite Danielle Jean");
        assert_eq!(clean_line("||"), "");
        assert_eq!(clean_line("\tThe Row\u{00A0}Tote "), "The Row Tote");
    }

    #[test]
    fn split_lines_handles_crlf() {
        let lines: Vec<&str> = split_lines("A\r\nb\rC\nD").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines, vec!["A", "b", "C", "D"]);
    }
}
