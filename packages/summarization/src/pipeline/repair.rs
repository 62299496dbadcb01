//! Leakage detection and the corrective rewrite pass.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Result;
use crate::pipeline::output::normalize_reduce_text;
use crate::pipeline::prompts::format_repair_prompt;
use crate::postprocess::{last_sentence_words, SHORT_SENTENCE_WORDS};
use crate::privacy::{detect_pii, PiiKind};
use crate::traits::generator::Generator;

lazy_static! {
    static ref META_SENTENCE: Regex =
        Regex::new(r"(?i)\bdeze\s+samenvatting\s+is\s+gebaseerd\b").unwrap();
    // "betrokkene de", "aangever computer": a role followed by a token that
    // usually means a name was cut out of the sentence
    static ref ROLE_LEAK: Regex =
        Regex::new(r"(?i)\b(betrokkene|aangever|aangeefster|getuige)\s+(de|computer)\b").unwrap();
}

/// Whether a summary still shows tag echoes, meta-text, PII or a dangling ending.
pub fn needs_repair(summary: &str) -> bool {
    let text = summary.trim();
    if text.is_empty() {
        return false;
    }

    if text.contains("[TEKST]")
        || text.contains("</TEKST>")
        || text.to_uppercase().contains("DEELSAMENVATTING")
        || META_SENTENCE.is_match(text)
    {
        return true;
    }

    // Phone-shaped digit runs are too noisy to trigger a rewrite on their own
    if detect_pii(text)
        .matches
        .iter()
        .any(|m| m.kind != PiiKind::Phone)
    {
        return true;
    }

    if ROLE_LEAK.is_match(text) {
        return true;
    }

    let words = last_sentence_words(text);
    words > 0 && words <= SHORT_SENTENCE_WORDS
}

/// Ask the model to rewrite `summary` anonymously, adding and dropping no facts.
pub async fn repair<G: Generator + ?Sized>(
    generator: &G,
    summary: &str,
    max_tokens: usize,
) -> Result<String> {
    let prompt = format_repair_prompt(summary);
    let output = generator.generate(&prompt, max_tokens).await?;
    Ok(normalize_reduce_text(&output))
}
