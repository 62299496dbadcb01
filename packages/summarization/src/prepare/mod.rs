//! Text preparation ahead of chunking.
//!
//! Every document is sanitized (line endings, page footers, return-address
//! headers, stray markdown emphasis). Some categories then get reduced to
//! the part worth summarizing:
//!
//! - charge sheets are sliced to the suspicion block
//! - criminal-record extracts are sliced from the first case heading
//! - police reports lose boilerplate lines, get interview Q/A compaction
//!   when they look like a transcript, and have long numeric tables folded

pub mod extract;
pub mod police;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::types::category::{CategoryCode, CategoryKind};
use crate::types::config::PreparerConfig;

lazy_static! {
    static ref PAGE_FOOTER: Regex = Regex::new(r"(?i)\bPagina\s+\d+\s+van\s+\d+\s*").unwrap();
    static ref RETURN_ADDRESS: Regex = Regex::new(r"(?im)^\s*Retouradres.*$").unwrap();
    static ref EXCESS_BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Collapse runs of three or more newlines into one blank line.
pub(crate) fn collapse_blank_lines(text: &str) -> String {
    EXCESS_BLANK_LINES.replace_all(text, "\n\n").into_owned()
}

/// Normalize line endings and strip boilerplate common to all documents.
pub fn sanitize(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n");
    let text = PAGE_FOOTER.replace_all(&text, "");
    let text = RETURN_ADDRESS.replace_all(&text, "");
    let text = text.replace("**", "");
    collapse_blank_lines(&text).trim().to_string()
}

/// Applies category-specific extraction and compaction.
#[derive(Debug, Clone, Default)]
pub struct TextPreparer {
    config: PreparerConfig,
}

impl TextPreparer {
    pub fn new(config: PreparerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreparerConfig {
        &self.config
    }

    /// Sanitize, then extract.
    pub fn prepare(&self, raw: &str, category: &CategoryCode) -> String {
        self.extract(&sanitize(raw), category)
    }

    /// Category-specific extraction on already sanitized text.
    pub fn extract(&self, text: &str, category: &CategoryCode) -> String {
        let before = text.len();
        let out = match category.kind() {
            CategoryKind::ChargeSheet => {
                extract::charge_sheet_relevant(text, self.config.closer_min_offset)
            }
            CategoryKind::RecordExtract => extract::record_extract_relevant(text),
            CategoryKind::PoliceReport => {
                let text = police::strip_boilerplate(text);
                let text = if police::is_interview_transcript(&text, &self.config) {
                    debug!("police report looks like an interview transcript");
                    police::compact_interview(&text)
                } else {
                    text.trim().to_string()
                };
                police::compact_numeric_runs(&text, &self.config)
            }
            CategoryKind::General => text.to_string(),
        };
        debug!(category = %category, before, after = out.len(), "prepared text");
        out
    }
}

/// Sanitize and extract with default thresholds.
pub fn prepare(raw: &str, category: &CategoryCode) -> String {
    TextPreparer::default().prepare(raw, category)
}
