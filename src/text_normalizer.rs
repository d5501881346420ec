/*!
 * Post-processing of model output.
 *
 * Completion endpoints return text with stray whitespace, transliterated
 * product names and missing spacing between CJK and Latin runs. This module
 * cleans that up deterministically. `normalize` is pure and idempotent.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Keywords that must keep their canonical spelling regardless of what the
/// model produced. Checked as plain substrings, longest first.
const KEYWORD_TABLE: &[(&str, &str)] = &[
    ("我的世界", "Minecraft"),
];

static LATIN_THEN_CJK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z0-9])([一-龥])").expect("valid regex"));

static CJK_THEN_LATIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([一-龥])([A-Za-z0-9])").expect("valid regex"));

/// Normalize raw completion output.
///
/// - trims leading/trailing whitespace and newlines
/// - restores canonical keywords from the substitution table
/// - inserts a single space at every Latin/CJK boundary in either direction
pub fn normalize(raw: &str) -> String {
    let mut text = raw.trim().trim_matches('\n').to_string();

    for (from, to) in KEYWORD_TABLE {
        text = text.replace(from, to);
    }

    // Replacing one boundary cannot create another: the inserted space is
    // neither Latin-alphanumeric nor CJK, which keeps the pass idempotent.
    let text = LATIN_THEN_CJK.replace_all(&text, "$1 $2");
    let text = CJK_THEN_LATIN.replace_all(&text, "$1 $2");

    text.into_owned()
}
