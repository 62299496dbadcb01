//! Document summarization: prepare, chunk, MAP, REDUCE, clean up.

use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::pipeline::chunk::chunk;
use crate::pipeline::map::MapStage;
use crate::pipeline::output::normalize_reduce_text;
use crate::pipeline::prompts::directives;
use crate::pipeline::reduce::ReduceStage;
use crate::pipeline::repair::{needs_repair, repair};
use crate::postprocess::{
    best_effort, dedupe_lines_and_paragraphs, shorten_record_extract, trim_trailing_fragment,
};
use crate::prepare::{sanitize, TextPreparer};
use crate::privacy::{police_report_style, pre_anonymize, redact_summary, scrub_names};
use crate::traits::generator::Generator;
use crate::traits::template::TemplateSource;
use crate::types::category::{CategoryCode, CategoryKind};
use crate::types::config::SummarizerConfig;
use crate::types::progress::{emit_safely, NoProgress, ProgressEvent, ProgressSink};

/// Returned when nothing is left to summarize after preparation.
pub const NO_TEXT_FOUND: &str = "Geen tekst aangetroffen.";

/// Summarizes documents with a generator and per-category templates.
///
/// The generator is used as given. To serialize model access across
/// concurrent callers, pass a shared
/// [`SerializedGenerator`](crate::traits::generator::SerializedGenerator).
///
/// # Example
///
/// ```rust,ignore
/// use summarization::{BuiltinTemplates, Summarizer, SerializedGenerator};
///
/// let generator = Arc::new(SerializedGenerator::new(backend));
/// let summarizer = Summarizer::new(generator, BuiltinTemplates);
/// let summary = summarizer.summarize(Some("PV"), &text).await?;
/// ```
pub struct Summarizer<G, T> {
    generator: G,
    templates: T,
    config: SummarizerConfig,
    preparer: TextPreparer,
}

impl<G: Generator, T: TemplateSource> Summarizer<G, T> {
    pub fn new(generator: G, templates: T) -> Self {
        Self {
            generator,
            templates,
            config: SummarizerConfig::default(),
            preparer: TextPreparer::default(),
        }
    }

    pub fn with_config(mut self, config: SummarizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_preparer(mut self, preparer: TextPreparer) -> Self {
        self.preparer = preparer;
        self
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Summarize without progress reporting. A missing category is UNKNOWN.
    pub async fn summarize(&self, category: Option<&str>, text: &str) -> Result<String> {
        let category = CategoryCode::from_option(category);
        self.summarize_document(&category, text, &NoProgress).await
    }

    /// Summarize one document.
    ///
    /// Fails only when generation fails (a MAP chunk after its retry, or a
    /// REDUCE call) or the category's templates cannot be loaded. Every
    /// other degenerate outcome is handled by the fallback ladder: redo the
    /// cleanup from the raw summary, repair leaked PII or meta-text, and
    /// repair from the raw summary when the result is still too short.
    #[instrument(skip(self, category, text, progress), fields(category = %category, input_chars = text.len()))]
    pub async fn summarize_document(
        &self,
        category: &CategoryCode,
        text: &str,
        progress: &dyn ProgressSink,
    ) -> Result<String> {
        let templates = self.templates.load(category)?;

        let text = sanitize(text);
        let text = best_effort("pre_anonymize", &text, pre_anonymize);
        let text = self.preparer.extract(&text, category);

        let chunks = chunk(&text, self.config.max_chars_per_chunk);
        if chunks.is_empty() {
            info!("no text left after preparation");
            emit_safely(progress, ProgressEvent::NoText);
            return Ok(NO_TEXT_FOUND.to_string());
        }

        emit_safely(
            progress,
            ProgressEvent::Started {
                category: category.clone(),
                chunks: chunks.len(),
                max_chars: self.config.max_chars_per_chunk,
                ctx: self.config.target_ctx,
                reduce: templates.has_reduce(),
            },
        );
        info!(chunks = chunks.len(), reduce = templates.has_reduce(), "summarization started");

        let (map_directive, reduce_directive) = directives(self.config.fast_mode);
        let active = if self.config.fast_mode {
            let n = self.config.fast_max_chunks.max(1).min(chunks.len());
            emit_safely(progress, ProgressEvent::FastMode { chunks: n });
            &chunks[..n]
        } else {
            &chunks[..]
        };

        let mut partials = MapStage::new(&self.generator, &self.config, &templates.map, &map_directive)
            .run(active, progress)
            .await?;

        let max_partials = self.config.max_partials;
        if max_partials > 0 && partials.len() > max_partials {
            emit_safely(
                progress,
                ProgressEvent::PartialsTrimmed {
                    from: partials.len(),
                    to: max_partials,
                },
            );
            partials.truncate(max_partials);
        }

        let raw = ReduceStage::new(&self.generator, &self.config, &templates.reduce, &reduce_directive)
            .run(partials, progress)
            .await?;

        let mut summary = self.post_process(&raw, category);

        if self.is_too_short(&summary) {
            info!(chars = summary.len(), "cleanup left too little text, redoing it from raw summary");
            emit_safely(progress, ProgressEvent::FallbackFromRaw);
            summary = self.conservative_post_process(&raw);
        }

        if self.config.repair_enabled && needs_repair(&summary) {
            emit_safely(progress, ProgressEvent::Repair);
            if let Some(repaired) = self.repair_and_clean(&summary, category, progress).await {
                summary = repaired;
            }
        }

        if self.config.repair_enabled && self.is_too_short(&summary) {
            emit_safely(progress, ProgressEvent::RepairFromRaw);
            if let Some(repaired) = self.repair_and_clean(&raw, category, progress).await {
                summary = repaired;
            }
        }

        let mut summary = normalize_reduce_text(&summary);
        if summary.is_empty() {
            summary = normalize_reduce_text(&redact_summary(&raw).text);
        }

        info!(output_chars = summary.len(), "summarization finished");
        emit_safely(progress, ProgressEvent::Finished);
        Ok(summary)
    }

    /// Redaction, name scrub, category style, dedupe, fragment trim,
    /// category trim.
    fn post_process(&self, text: &str, category: &CategoryCode) -> String {
        let kind = category.kind();

        let mut out = best_effort("redact", text, |t| redact_summary(t).text);
        out = best_effort("scrub_names", &out, scrub_names);
        if kind == CategoryKind::PoliceReport {
            out = best_effort("police_report_style", &out, police_report_style);
        }
        out = best_effort("dedupe", &out, dedupe_lines_and_paragraphs);
        out = best_effort("trim_fragment", &out, trim_trailing_fragment);
        if kind == CategoryKind::RecordExtract {
            out = best_effort("shorten_record_extract", &out, shorten_record_extract);
        }
        out
    }

    /// The non-destructive part of the cleanup: redaction, name scrub, dedupe.
    fn conservative_post_process(&self, text: &str) -> String {
        let out = best_effort("redact", text, |t| redact_summary(t).text);
        let out = best_effort("scrub_names", &out, scrub_names);
        best_effort("dedupe", &out, dedupe_lines_and_paragraphs)
    }

    fn is_too_short(&self, text: &str) -> bool {
        text.trim().chars().count() < self.config.min_output_chars
    }

    /// Repair `text` and run the cleanup on the result. Failures are logged
    /// and reported, never returned.
    async fn repair_and_clean(
        &self,
        text: &str,
        category: &CategoryCode,
        progress: &dyn ProgressSink,
    ) -> Option<String> {
        match repair(&self.generator, text, self.config.repair_max_tokens).await {
            Ok(repaired) => Some(self.post_process(&repaired, category)),
            Err(e) => {
                warn!(error = %e, "repair pass failed, keeping best-effort output");
                emit_safely(progress, ProgressEvent::RepairFailed);
                None
            }
        }
    }
}
