//! Text normalization and gloss tokenization.

use regex::Regex;
use std::sync::LazyLock;

// Alphanumeric runs, optionally joined by single internal apostrophes.
#[allow(clippy::expect_used)]
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Alphabetic}\p{N}]+(?:'[\p{Alphabetic}\p{N}]+)*").expect("valid regex")
});

#[allow(clippy::expect_used)]
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

const APOSTROPHE_VARIANTS: [char; 4] = ['\u{2019}', '\u{2018}', '`', '\u{02BC}'];

/// Collapse whitespace runs to one space and trim.
pub fn normalize_line(raw: &str) -> String {
    SPACE_RE.replace_all(raw, " ").trim().to_string()
}

/// Fold typographic apostrophes and backticks to `'`.
pub fn fold_apostrophes(text: &str) -> String {
    text.chars()
        .map(|c| {
            if APOSTROPHE_VARIANTS.contains(&c) {
                '\''
            } else {
                c
            }
        })
        .collect()
}

/// Lowercased word tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    let folded = fold_apostrophes(text);
    WORD_RE
        .find_iter(&folded)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Uppercase gloss sequence with strictly adjacent repeats collapsed.
pub fn glossify(text: &str) -> Vec<String> {
    let mut glosses: Vec<String> = Vec::new();
    for token in tokenize(text) {
        let gloss = token.to_uppercase();
        if glosses.last() != Some(&gloss) {
            glosses.push(gloss);
        }
    }
    glosses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line() {
        assert_eq!(normalize_line("  hello \t  world \r"), "hello world");
        assert_eq!(normalize_line(" \t "), "");
    }

    #[test]
    fn test_tokenize_keeps_internal_apostrophes() {
        assert_eq!(tokenize("Don't stop, it's fine!"), vec!["don't", "stop", "it's", "fine"]);
    }

    #[test]
    fn test_apostrophe_variants_fold() {
        assert_eq!(tokenize("don\u{2019}t"), vec!["don't"]);
        assert_eq!(tokenize("can`t"), vec!["can't"]);
        assert_eq!(tokenize("won\u{02BC}t"), vec!["won't"]);
    }

    #[test]
    fn test_edge_apostrophes_are_dropped() {
        assert_eq!(tokenize("'quoted' runners'"), vec!["quoted", "runners"]);
    }

    #[test]
    fn test_punctuation_and_digits() {
        assert_eq!(tokenize("Room 101... now?"), vec!["room", "101", "now"]);
    }

    #[test]
    fn test_unicode_letters_are_words() {
        assert_eq!(tokenize("Café déjà vu"), vec!["café", "déjà", "vu"]);
    }

    #[test]
    fn test_glossify_collapses_only_adjacent_repeats() {
        assert_eq!(
            glossify("hello hello world hello"),
            vec!["HELLO", "WORLD", "HELLO"]
        );
        assert_eq!(glossify("Go, GO go!"), vec!["GO"]);
    }

    #[test]
    fn test_glossify_empty() {
        assert!(glossify("?!...").is_empty());
    }
}
