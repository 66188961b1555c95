//! Content validation for task descriptions and journal entry bodies.
//!
//! # Responsibility
//! - Decide whether text carries real (non-whitespace) content.
//! - Strip markup tags and decode common HTML entities for that decision.
//!
//! # Invariants
//! - Pure functions; no side effects, no allocation on the happy rejection path.
//! - `&amp;` is decoded last so entity text is never double-decoded.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Returns whether `text` carries real content.
///
/// Plain text is valid iff its trimmed form is non-empty. Markup-bearing
/// text is valid iff stripping tags and decoding entities leaves a
/// non-empty trimmed string, so `<p><br></p>` and `&nbsp;` count as blank.
pub fn is_valid_content(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    if !bears_markup(text) {
        return true;
    }
    !strip_markup(text).is_empty()
}

/// Reduces markup-bearing text to normalized plain text.
///
/// Tags are replaced by spaces, the entities `&nbsp; &lt; &gt; &quot;
/// &#39; &amp;` are decoded, and whitespace runs collapse to single
/// spaces with the result trimmed.
pub fn strip_markup(text: &str) -> String {
    let without_tags = MARKUP_TAG_RE.replace_all(text, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

fn bears_markup(text: &str) -> bool {
    MARKUP_TAG_RE.is_match(text) || text.contains('&')
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
