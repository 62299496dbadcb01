//! Cleanup passes on generated summaries.
//!
//! These run after redaction and never fail: a pass that panics is logged
//! and its input is passed through unchanged.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

lazy_static! {
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n\s*\n").unwrap();

    static ref COUNT_LABEL: Regex =
        Regex::new(r"(?i)\b(primair|subsidiair|meer subsidiair)\b").unwrap();
    static ref OFFENCE_NUMBER: Regex = Regex::new(r"(?i)\bfeit\s*\d+\b").unwrap();
    static ref PROBATION_DATES: Regex = Regex::new(
        r"(?i)\b(start-?\s*en\s*einddatum\s*proeftijd|startdatum\s*proeftijd|einddatum\s*proeftijd)\b.*"
    ).unwrap();
    static ref CIVIL_DETENTION: Regex = Regex::new(r"(?i)\bgijzeling\b.*").unwrap();
    static ref EURO_AMOUNT: Regex = Regex::new(r"€\s*\d{1,3}(?:\.\d{3})*(?:,\d{2})?").unwrap();

    static ref DOUBLE_SPACES: Regex = Regex::new(r"[ \t]{2,}").unwrap();
    static ref EXCESS_BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Verbs whose presence makes a short closing sentence complete enough to keep.
const COMMON_VERBS: &[&str] = &[
    "is", "was", "waren", "werd", "werden", "heeft", "hebben", "had", "hadden", "blijkt", "bleek",
    "bleken", "vond", "vonden", "kwam", "kwamen", "zei", "zeiden", "verklaarde", "verklaarden",
    "stuurde", "vroeg", "vroegen", "betaalde", "betaalden", "onderzocht", "onderzochten",
    "gevonden", "trof", "troffen", "opgenomen",
];

/// Closing sentences of at most this many words are candidates for trimming.
pub const SHORT_SENTENCE_WORDS: usize = 5;

/// Split after `.`, `!` or `?` followed by whitespace.
pub(crate) fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut after_stop = false;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() && after_stop {
            let mut end = i + c.len_utf8();
            while let Some(&(j, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = j + next.len_utf8();
                chars.next();
            }
            sentences.push(&text[start..i]);
            start = end;
            after_stop = false;
            continue;
        }
        after_stop = matches!(c, '.' | '!' | '?');
    }
    sentences.push(&text[start..]);
    sentences
}

/// Word count of the last sentence, if the text has any words at all.
pub(crate) fn last_sentence_words(text: &str) -> usize {
    split_sentences(text.trim())
        .last()
        .map(|s| s.split_whitespace().count())
        .unwrap_or(0)
}

/// Drop repeated lines, then repeated consecutive paragraphs.
///
/// Blank lines are never considered duplicates. Whitespace-only input is
/// returned as is.
pub fn dedupe_lines_and_paragraphs(text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    let mut seen = HashSet::new();
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| {
            let key = line.trim();
            key.is_empty() || seen.insert(key)
        })
        .collect();
    let joined = lines.join("\n");

    let mut paragraphs: Vec<&str> = Vec::new();
    for paragraph in PARAGRAPH_BREAK.split(&joined).map(str::trim) {
        if paragraph.is_empty() || paragraphs.last() == Some(&paragraph) {
            continue;
        }
        paragraphs.push(paragraph);
    }

    paragraphs.join("\n\n").trim().to_string()
}

/// Remove a short closing sentence that has no recognizable verb.
///
/// Truncated generations tend to end in a dangling fragment ("Daarnaast
/// de auto."). Single-sentence texts are always kept.
pub fn trim_trailing_fragment(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    let sentences = split_sentences(text);
    if sentences.len() < 2 {
        return text.to_string();
    }

    let last = sentences[sentences.len() - 1].trim();
    if last.is_empty() || last.split_whitespace().count() > SHORT_SENTENCE_WORDS {
        return text.to_string();
    }

    let has_verb = last
        .split_whitespace()
        .map(|word| {
            word.to_lowercase()
                .chars()
                .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '\'' | '-'))
                .collect::<String>()
        })
        .any(|token| COMMON_VERBS.contains(&token.as_str()));

    if has_verb {
        text.to_string()
    } else {
        sentences[..sentences.len() - 1].join(" ").trim().to_string()
    }
}

/// Strip count labels, probation dates, civil detention and amounts from a
/// criminal-record summary.
pub fn shorten_record_extract(text: &str) -> String {
    let text = COUNT_LABEL.replace_all(text, "");
    let text = OFFENCE_NUMBER.replace_all(&text, "");
    let text = PROBATION_DATES.replace_all(&text, "");
    let text = CIVIL_DETENTION.replace_all(&text, "");
    let text = EURO_AMOUNT.replace_all(&text, "");

    let text = DOUBLE_SPACES.replace_all(&text, " ");
    EXCESS_BLANK_LINES
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}

/// Run a cleanup step, falling back to its input if it panics.
pub(crate) fn best_effort<F>(step: &str, text: &str, f: F) -> String
where
    F: FnOnce(&str) -> String,
{
    match catch_unwind(AssertUnwindSafe(|| f(text))) {
        Ok(out) => out,
        Err(_) => {
            warn!(step, "cleanup step panicked, keeping its input");
            text.to_string()
        }
    }
}
