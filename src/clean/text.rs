//! Removal of non-speech annotations from recognizer output.

use regex::Regex;
use std::sync::LazyLock;

// Patterns are literals; compiling them cannot fail.
#[allow(clippy::expect_used)]
static PAREN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));
#[allow(clippy::expect_used)]
static BRACKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"));
#[allow(clippy::expect_used)]
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strip `( ... )` and `[ ... ]` asides such as `(laughs)` or `[BLANK_AUDIO]`,
/// collapse whitespace runs and trim.
pub fn clean_text(raw: &str) -> String {
    let text = PAREN_RE.replace_all(raw, " ");
    let text = BRACKET_RE.replace_all(&text, " ");
    let text = SPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}
