//! Text normalization used for rule matching.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[_\-.]+").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref PAGE_FOOTER: Regex = Regex::new(r"(?i)Pagina\s+\d+\s+van\s+\d+\s*").unwrap();
    static ref RETURN_ADDRESS: Regex = Regex::new(r"(?im)^\s*Retouradres.*$").unwrap();
    static ref EXCESS_BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Lowercase and strip diacritics ("Justitiële" -> "justitiele").
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Normalize, turn `_ - .` runs into spaces and collapse whitespace.
pub fn prep_for_search(text: &str) -> String {
    let text = normalize(text);
    let text = SEPARATORS.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Remove page footers and return-address headers that would otherwise
/// drown out real signals.
pub fn sanitize_for_classifier(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = PAGE_FOOTER.replace_all(&text, " ");
    let text = RETURN_ADDRESS.replace_all(&text, " ");
    let text = EXCESS_BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Whether `token` occurs in `haystack` without an ASCII letter or digit
/// directly on either side.
pub fn token_match(haystack: &str, token: &str) -> bool {
    bounded_match(haystack, token, true)
}

/// Like [`token_match`], but the word may continue after `prefix`.
pub fn prefix_match(haystack: &str, prefix: &str) -> bool {
    bounded_match(haystack, prefix, false)
}

fn bounded_match(haystack: &str, needle: &str, closed_end: bool) -> bool {
    if needle.is_empty() {
        return false;
    }
    let bytes = haystack.as_bytes();
    let is_word = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    haystack.match_indices(needle).any(|(start, m)| {
        let end = start + m.len();
        let before_ok = start == 0 || !is_word(bytes[start - 1]);
        let after_ok = !closed_end || end >= bytes.len() || !is_word(bytes[end]);
        before_ok && after_ok
    })
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
