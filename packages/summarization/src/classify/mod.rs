//! Rule-scoring document classifier.
//!
//! Decision order, short-circuiting on the first hit:
//!
//! 1. Filename prefix: first (or second) token of the normalized stem is
//!    an allowed category code.
//! 2. Strong content patterns: headings distinctive enough to win outright.
//! 3. Scored match: phrase/token hits over filename and content, with a
//!    tie-break order and an ambiguity policy that prefers UNKNOWN over a
//!    risky guess.

pub mod normalize;
pub mod rules;

pub use rules::{RuleEntry, RuleOverrides, RuleTable};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::types::category::{CategoryCode, CategorySet};
use crate::types::config::ClassifierConfig;
use normalize::{prefix_match, prep_for_search, sanitize_for_classifier, token_match, truncate_chars};

lazy_static! {
    // Searched text has dashes turned into spaces, so accept either.
    static ref POLICE_REPORT_NUMBER: Regex = Regex::new(r"\bpl\d{4}[\s-]\d{6,}\b").unwrap();
    static ref CHARGE_BLOCK: Regex = Regex::new(r"\bervan verdacht wordt\b").unwrap();
    static ref RECORD_OPEN_CASES: Regex =
        Regex::new(r"\bopenstaande zaken betreffende misdrijven\b").unwrap();
    static ref RECORD_CLOSED_CASES: Regex =
        Regex::new(r"\bvolledig afgedane zaken betreffende misdrijven\b").unwrap();
    static ref ACCOUNTABILITY: Regex = Regex::new(r"\btoerekeningsvat\b").unwrap();
    static ref ARRAIGNMENT_CONSULT: Regex = Regex::new(r"\bvoorgeleidingsconsult\b").unwrap();
    static ref PROBATION: Regex = Regex::new(r"\breclassering\b").unwrap();
}

/// Why a category was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassificationReason {
    /// A token of the filename stem is a category code.
    FilenamePrefix,

    /// A distinctive content pattern matched.
    StrongPattern,

    /// Highest score with a clear margin.
    Scored,

    /// Top two candidates too close to call.
    Ambiguous {
        best: CategoryCode,
        best_score: i64,
        second: CategoryCode,
        second_score: i64,
    },

    /// Nothing scored above zero.
    NoSignal,
}

/// Outcome of [`Classifier::classify_detailed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: CategoryCode,
    pub score: i64,
    pub filename_hits: Vec<String>,
    pub content_hits: Vec<String>,
    pub reason: ClassificationReason,
}

impl Classification {
    fn short_circuit(category: CategoryCode, reason: ClassificationReason) -> Self {
        Self {
            category,
            score: 0,
            filename_hits: Vec::new(),
            content_hits: Vec::new(),
            reason,
        }
    }
}

struct Candidate {
    category: CategoryCode,
    score: i64,
    priority: usize,
    filename_hits: Vec<String>,
    content_hits: Vec<String>,
}

/// Assigns a category code to a document from its filename and content.
///
/// Holds an immutable rule table built once at startup; classification
/// never fails and degrades to UNKNOWN.
#[derive(Debug, Clone)]
pub struct Classifier {
    categories: CategorySet,
    rules: RuleTable,
    config: ClassifierConfig,
}

impl Classifier {
    /// Classifier over `categories` using the built-in rules.
    pub fn new(categories: CategorySet) -> Self {
        let rules = RuleTable::defaults(&categories);
        Self {
            categories,
            rules,
            config: ClassifierConfig::default(),
        }
    }

    /// Merge `overrides` into the built-in rules.
    pub fn with_overrides(mut self, overrides: &RuleOverrides) -> Self {
        self.rules = RuleTable::build(&self.categories, overrides);
        self
    }

    pub fn with_config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Classify a document, returning only the code.
    pub fn classify(&self, filename: &str, content: &str) -> CategoryCode {
        self.classify_detailed(filename, content).category
    }

    /// Classify a document, keeping score and hit diagnostics.
    pub fn classify_detailed(&self, filename: &str, content: &str) -> Classification {
        let path = Path::new(filename);

        if let Some(code) = self.match_filename_prefix(path) {
            debug!(category = %code, "classified by filename prefix");
            return Classification::short_circuit(code, ClassificationReason::FilenamePrefix);
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name_search = prep_for_search(&name);
        let content_window = truncate_chars(content, self.config.content_window);
        let content_search = prep_for_search(&sanitize_for_classifier(content_window));

        if let Some(code) = self.match_strong_pattern(&content_search) {
            debug!(category = %code, "classified by strong pattern");
            return Classification::short_circuit(code, ClassificationReason::StrongPattern);
        }

        let mut candidates = self.score_candidates(&name_search, &content_search);
        candidates.sort_by(|a, b| b.score.cmp(&a.score).then(a.priority.cmp(&b.priority)));

        let mut ranked = candidates.into_iter();
        let Some(best) = ranked.next() else {
            debug!("no category signal");
            return Classification::short_circuit(
                CategoryCode::unknown(),
                ClassificationReason::NoSignal,
            );
        };

        if let Some(second) = ranked.next() {
            if self.too_close(best.score, second.score) {
                debug!(
                    best = %best.category,
                    best_score = best.score,
                    second = %second.category,
                    second_score = second.score,
                    "ambiguous classification"
                );
                return Classification {
                    category: CategoryCode::unknown(),
                    score: best.score,
                    filename_hits: best.filename_hits,
                    content_hits: best.content_hits,
                    reason: ClassificationReason::Ambiguous {
                        best: best.category,
                        best_score: best.score,
                        second: second.category,
                        second_score: second.score,
                    },
                };
            }
        }

        debug!(category = %best.category, score = best.score, "classified by score");
        Classification {
            category: best.category,
            score: best.score,
            filename_hits: best.filename_hits,
            content_hits: best.content_hits,
            reason: ClassificationReason::Scored,
        }
    }

    fn match_filename_prefix(&self, path: &Path) -> Option<CategoryCode> {
        let stem = path.file_stem()?.to_string_lossy();
        let prepared = prep_for_search(&stem);
        prepared
            .split_whitespace()
            .take(2)
            .map(CategoryCode::new)
            .find(|code| self.categories.contains(code.as_str()))
    }

    fn match_strong_pattern(&self, content: &str) -> Option<CategoryCode> {
        let allowed = |code: &str| self.categories.contains(code);

        if allowed("UJD")
            && (RECORD_OPEN_CASES.is_match(content) || RECORD_CLOSED_CASES.is_match(content))
        {
            return Some(CategoryCode::new("UJD"));
        }
        if allowed("TLL") && CHARGE_BLOCK.is_match(content) {
            return Some(CategoryCode::new("TLL"));
        }
        if allowed("PV")
            && POLICE_REPORT_NUMBER.is_match(content)
            && content.contains("proces verbaal")
        {
            return Some(CategoryCode::new("PV"));
        }
        if allowed("PJ") && ACCOUNTABILITY.is_match(content) {
            return Some(CategoryCode::new("PJ"));
        }
        if allowed("VC") && ARRAIGNMENT_CONSULT.is_match(content) {
            return Some(CategoryCode::new("VC"));
        }
        if allowed("RECLASS")
            && PROBATION.is_match(content)
            && ["toezicht", "meldplicht", "risc", "risic"]
                .iter()
                .any(|marker| content.contains(marker))
        {
            return Some(CategoryCode::new("RECLASS"));
        }
        None
    }

    fn score_candidates(&self, name: &str, content: &str) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for (position, (code, rule)) in self.rules.iter().enumerate() {
            if rule.is_empty() {
                continue;
            }
            let (name_score, filename_hits) = self.score_matches(name, rule);
            let (content_score, content_hits) = self.score_matches(content, rule);
            let score = (name_score as f64 * self.config.filename_weight) as i64 + content_score;
            if score > 0 {
                candidates.push(Candidate {
                    category: code.clone(),
                    score,
                    priority: self.priority_of(code, position),
                    filename_hits,
                    content_hits,
                });
            }
        }
        candidates
    }

    fn score_matches(&self, haystack: &str, rule: &RuleEntry) -> (i64, Vec<String>) {
        let mut score = 0;
        let mut hits = Vec::new();

        for phrase in &rule.phrases {
            let (needle, matched) = match phrase.strip_suffix('*') {
                Some(stem) => {
                    let needle = prep_for_search(stem);
                    let matched = prefix_match(haystack, &needle);
                    (needle, matched)
                }
                None => {
                    let needle = prep_for_search(phrase);
                    let matched = token_match(haystack, &needle);
                    (needle, matched)
                }
            };
            if matched {
                score += self.config.phrase_bonus + needle.chars().count() as i64;
                hits.push(phrase.clone());
            }
        }
        for token in &rule.tokens {
            let needle = prep_for_search(token);
            if token_match(haystack, &needle) {
                score += self.config.token_bonus + needle.chars().count() as i64;
                hits.push(token.clone());
            }
        }

        (score, hits)
    }

    fn priority_of(&self, code: &CategoryCode, position: usize) -> usize {
        self.config
            .priority
            .iter()
            .position(|p| p.eq_ignore_ascii_case(code.as_str()))
            .unwrap_or(self.config.priority.len() + position)
    }

    fn too_close(&self, best: i64, second: i64) -> bool {
        let ratio_limit = (second as f64 * self.config.ambiguity_ratio) as i64;
        best <= ratio_limit || best - second < self.config.ambiguity_min_gap
    }
}

/// One-shot classification with the built-in rules.
pub fn classify(filename: &str, content: &str, categories: &CategorySet) -> CategoryCode {
    Classifier::new(categories.clone()).classify(filename, content)
}
