//! Configuration types for classification, text preparation and the
//! MAP-REDUCE pipeline.
//!
//! Every tuned constant lives here so callers can adjust it without
//! touching the algorithms.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::error::{Result, SummarizationError};

/// Configuration for the summarization pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Maximum characters per chunk. Default: 1800.
    pub max_chars_per_chunk: usize,

    /// Model context window in tokens. Default: 2048.
    pub target_ctx: usize,

    /// Token budget for each MAP call. Default: 180.
    pub map_max_tokens: usize,

    /// Token budget for each REDUCE call. Default: 1024.
    pub reduce_max_tokens: usize,

    /// Token budget for the repair pass. Default: 768.
    pub repair_max_tokens: usize,

    /// Partials merged per REDUCE call. Default: 4.
    pub group_size: usize,

    /// Keep at most this many MAP partials (0 = no cap). Default: 6.
    pub max_partials: usize,

    /// Only summarize the first `fast_max_chunks` chunks.
    pub fast_mode: bool,

    /// Chunks processed in fast mode. Default: 1.
    pub fast_max_chunks: usize,

    /// Run the corrective generation pass when leakage is detected.
    ///
    /// Default: true.
    pub repair_enabled: bool,

    /// Output shorter than this triggers the fallback ladder. Default: 40.
    pub min_output_chars: usize,

    /// Prompt fitting parameters.
    #[serde(default)]
    pub fit: FitConfig,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_chars_per_chunk: 1800,
            target_ctx: 2048,
            map_max_tokens: 180,
            reduce_max_tokens: 1024,
            repair_max_tokens: 768,
            group_size: 4,
            max_partials: 6,
            fast_mode: false,
            fast_max_chunks: 1,
            repair_enabled: true,
            min_output_chars: 40,
            fit: FitConfig::default(),
        }
    }
}

impl SummarizerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load defaults, then apply `FS_*` environment overrides.
    ///
    /// Reads a `.env` file first when present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        if let Some(v) = env_parse("FS_MAX_CHARS_PER_CHUNK")? {
            config.max_chars_per_chunk = v;
        }
        if let Some(v) = env_parse("FS_CTX")? {
            config.target_ctx = v;
        }
        if let Some(v) = env_parse("FS_MAP_MAX_NEW")? {
            config.map_max_tokens = v;
        }
        if let Some(v) = env_parse("FS_REDUCE_MAX_NEW")? {
            config.reduce_max_tokens = v;
        }
        if let Some(v) = env_parse("FS_REPAIR_MAX_NEW")? {
            config.repair_max_tokens = v;
        }
        if let Some(v) = env_parse("FS_GROUP_SIZE")? {
            config.group_size = v;
        }
        if let Some(v) = env_parse("FS_MAX_PARTIALS")? {
            config.max_partials = v;
        }
        if let Some(v) = env_flag("FS_FAST_MODE")? {
            config.fast_mode = v;
        }
        if let Some(v) = env_parse("FS_FAST_MAX_CHUNKS")? {
            config.fast_max_chunks = v;
        }
        if let Some(v) = env_flag("FS_ENABLE_REPAIR_PASS")? {
            config.repair_enabled = v;
        }
        Ok(config)
    }

    pub fn with_max_chars_per_chunk(mut self, max: usize) -> Self {
        self.max_chars_per_chunk = max;
        self
    }

    pub fn with_target_ctx(mut self, ctx: usize) -> Self {
        self.target_ctx = ctx;
        self
    }

    pub fn with_group_size(mut self, size: usize) -> Self {
        self.group_size = size;
        self
    }

    pub fn with_max_partials(mut self, max: usize) -> Self {
        self.max_partials = max;
        self
    }

    /// Enable fast mode limited to the first `max_chunks` chunks.
    pub fn with_fast_mode(mut self, max_chunks: usize) -> Self {
        self.fast_mode = true;
        self.fast_max_chunks = max_chunks;
        self
    }

    pub fn with_repair(mut self, enabled: bool) -> Self {
        self.repair_enabled = enabled;
        self
    }

    /// Group size actually used by REDUCE (0 falls back to 4).
    pub fn effective_group_size(&self) -> usize {
        if self.group_size == 0 {
            4
        } else {
            self.group_size
        }
    }
}

/// Parameters of the shrink-to-fit prompt loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    /// Rough characters per token. Default: 3.6.
    pub chars_per_token: f64,

    /// Fraction of the context a prompt may fill. Default: 0.86.
    pub ctx_fill_ratio: f64,

    /// Lower bound of the MAP prompt limit in tokens. Default: 700.
    pub prompt_floor_tokens: usize,

    /// MAP body shrink factor per iteration. Default: 0.88.
    pub body_shrink_ratio: f64,

    /// Stop shrinking a MAP body below this many characters. Default: 600.
    pub body_min_chars: usize,

    /// REDUCE per-item cap shrink factor. Default: 0.85.
    pub reduce_item_shrink_ratio: f64,

    /// REDUCE items are capped down to this length before halving the group. Default: 800.
    pub reduce_item_min_chars: usize,

    /// Length fraction of a chunk kept for the MAP retry. Default: 0.75.
    pub map_retry_ratio: f64,

    /// Minimum characters kept for the MAP retry. Default: 800.
    pub map_retry_min_chars: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            chars_per_token: 3.6,
            ctx_fill_ratio: 0.86,
            prompt_floor_tokens: 700,
            body_shrink_ratio: 0.88,
            body_min_chars: 600,
            reduce_item_shrink_ratio: 0.85,
            reduce_item_min_chars: 800,
            map_retry_ratio: 0.75,
            map_retry_min_chars: 800,
        }
    }
}

/// Configuration for the rule-scoring classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Characters of content inspected. Default: 20000.
    pub content_window: usize,

    /// Multiplier applied to the filename score. Default: 1.3.
    pub filename_weight: f64,

    /// Fixed bonus per phrase hit (plus phrase length). Default: 100.
    pub phrase_bonus: i64,

    /// Fixed bonus per token hit (plus token length). Default: 10.
    pub token_bonus: i64,

    /// Best/second ratio at or below which the result is ambiguous. Default: 1.15.
    pub ambiguity_ratio: f64,

    /// Minimum point gap between best and second. Default: 40.
    pub ambiguity_min_gap: i64,

    /// Tie-break order; unlisted categories follow in configured order.
    pub priority: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            content_window: 20_000,
            filename_weight: 1.3,
            phrase_bonus: 100,
            token_bonus: 10,
            ambiguity_ratio: 1.15,
            ambiguity_min_gap: 40,
            priority: ["VC", "PJ", "PV", "RECLASS", "UJD", "TLL"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Thresholds used by category-specific text preparation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparerConfig {
    /// Consecutive numeric lines needed before a run is compacted. Default: 10.
    pub min_block_lines: usize,

    /// Lines kept at the start of a compacted run. Default: 6.
    pub keep_head: usize,

    /// Lines kept at the end of a compacted run. Default: 4.
    pub keep_tail: usize,

    /// Digits needed for a table-like line. Default: 12.
    pub numeric_min_digits: usize,

    /// Digits must exceed letters times this ratio. Default: 1.2.
    pub numeric_digit_ratio: f64,

    /// Digits needed on a line with an account marker. Default: 8.
    pub account_min_digits: usize,

    /// Digits needed on a dated row. Default: 10.
    pub dated_row_min_digits: usize,

    /// Maximum letters on a dated row. Default: 20.
    pub dated_row_max_letters: usize,

    /// Non-blank lines sampled for Q/A detection. Default: 2000.
    pub qa_sample_lines: usize,

    /// Q/A prefixed lines that mark a transcript outright. Default: 12.
    pub qa_min_hits: usize,

    /// Sample size needed for the density rule. Default: 200.
    pub qa_dense_min_lines: usize,

    /// Q/A hits needed for the density rule. Default: 6.
    pub qa_dense_min_hits: usize,

    /// Q/A density needed for the density rule. Default: 0.02.
    pub qa_min_density: f64,

    /// A charge-sheet closer only counts past this offset. Default: 300.
    pub closer_min_offset: usize,
}

impl Default for PreparerConfig {
    fn default() -> Self {
        Self {
            min_block_lines: 10,
            keep_head: 6,
            keep_tail: 4,
            numeric_min_digits: 12,
            numeric_digit_ratio: 1.2,
            account_min_digits: 8,
            dated_row_min_digits: 10,
            dated_row_max_letters: 20,
            qa_sample_lines: 2000,
            qa_min_hits: 12,
            qa_dense_min_lines: 200,
            qa_dense_min_hits: 6,
            qa_min_density: 0.02,
            closer_min_offset: 300,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SummarizationError::Config(format!("{name} must be a number, got {raw:?}"))),
        _ => Ok(None),
    }
}

fn env_flag(name: &str) -> Result<Option<bool>> {
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" | "yes" | "on" | "ja" => Ok(Some(true)),
        "0" | "false" | "no" | "off" | "nee" => Ok(Some(false)),
        _ => Err(SummarizationError::Config(format!(
            "{name} must be a boolean (1/0, true/false, yes/no, on/off), got {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment is process-global; env tests must not interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let config = SummarizerConfig::default();
        assert_eq!(config.max_chars_per_chunk, 1800);
        assert_eq!(config.target_ctx, 2048);
        assert_eq!(config.group_size, 4);
        assert_eq!(config.max_partials, 6);
        assert!(config.repair_enabled);
        assert!(!config.fast_mode);
    }

    #[test]
    fn test_builders() {
        let config = SummarizerConfig::new()
            .with_group_size(0)
            .with_fast_mode(2)
            .with_repair(false);
        assert_eq!(config.effective_group_size(), 4);
        assert!(config.fast_mode);
        assert_eq!(config.fast_max_chunks, 2);
        assert!(!config.repair_enabled);
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("FS_GROUP_SIZE", "6");
        env::set_var("FS_ENABLE_REPAIR_PASS", "0");
        let config = SummarizerConfig::from_env().unwrap();
        env::remove_var("FS_GROUP_SIZE");
        env::remove_var("FS_ENABLE_REPAIR_PASS");

        assert_eq!(config.group_size, 6);
        assert!(!config.repair_enabled);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("FS_FAST_MAX_CHUNKS", "lots");
        let result = SummarizerConfig::from_env();
        env::remove_var("FS_FAST_MAX_CHUNKS");

        assert!(matches!(result, Err(SummarizationError::Config(_))));
    }

    #[test]
    fn test_env_flag_words() {
        let _guard = ENV_LOCK.lock().unwrap();
        for (raw, expected) in [("off", false), ("no", false), ("Nee", false), ("ON", true), ("yes", true)] {
            env::set_var("FS_FAST_MODE", raw);
            let result = SummarizerConfig::from_env();
            env::remove_var("FS_FAST_MODE");
            assert_eq!(result.unwrap().fast_mode, expected, "FS_FAST_MODE={raw}");
        }

        env::set_var("FS_ENABLE_REPAIR_PASS", "misschien");
        let result = SummarizerConfig::from_env();
        env::remove_var("FS_ENABLE_REPAIR_PASS");
        assert!(matches!(result, Err(SummarizationError::Config(_))));
    }

    #[test]
    fn test_classifier_priority_order() {
        let config = ClassifierConfig::default();
        assert_eq!(config.priority.first().map(String::as_str), Some("VC"));
        assert_eq!(config.priority.last().map(String::as_str), Some("TLL"));
    }
}
