//! MAP stage: one bullet list per chunk.

use std::time::Instant;
use tracing::{info, warn};

use crate::classify::normalize::truncate_chars;
use crate::error::Result;
use crate::pipeline::output::normalize_bullets;
use crate::pipeline::prompts::{fit_prompt, SYSTEM_PROMPT};
use crate::traits::generator::Generator;
use crate::types::config::SummarizerConfig;
use crate::types::progress::{emit_safely, ProgressEvent, ProgressSink};

/// Summarizes chunks in order with a category's MAP template.
pub struct MapStage<'a, G: ?Sized> {
    generator: &'a G,
    config: &'a SummarizerConfig,
    template: &'a str,
    directive: &'a str,
}

impl<'a, G: Generator + ?Sized> MapStage<'a, G> {
    pub fn new(
        generator: &'a G,
        config: &'a SummarizerConfig,
        template: &'a str,
        directive: &'a str,
    ) -> Self {
        Self {
            generator,
            config,
            template,
            directive,
        }
    }

    /// Run every chunk, strictly in order.
    pub async fn run(&self, chunks: &[String], progress: &dyn ProgressSink) -> Result<Vec<String>> {
        let total = chunks.len();
        let mut partials = Vec::with_capacity(total);

        for (i, chunk) in chunks.iter().enumerate() {
            let index = i + 1;
            emit_safely(progress, ProgressEvent::MapStarted { index, total });
            let started = Instant::now();

            let partial = self.summarize_chunk(index, chunk, progress).await?;
            info!(index, total, bullets = partial.lines().count(), "map chunk done");
            partials.push(partial);

            emit_safely(
                progress,
                ProgressEvent::MapDone {
                    index,
                    total,
                    elapsed: started.elapsed(),
                },
            );
        }

        Ok(partials)
    }

    /// Summarize one chunk, retrying once with a shorter chunk on a
    /// generation failure.
    pub async fn summarize_chunk(
        &self,
        index: usize,
        chunk: &str,
        progress: &dyn ProgressSink,
    ) -> Result<String> {
        let fit = &self.config.fit;
        let prompt = fit_prompt(
            SYSTEM_PROMPT,
            self.template,
            chunk,
            self.directive,
            self.config.target_ctx,
            fit,
        );

        let output = match self.generator.generate(&prompt, self.config.map_max_tokens).await {
            Ok(output) => output,
            Err(e) if e.is_generation() => {
                warn!(index, error = %e, "map generation failed, retrying with trimmed chunk");
                emit_safely(progress, ProgressEvent::MapRetry { index });

                let keep = fit
                    .map_retry_min_chars
                    .max((chunk.chars().count() as f64 * fit.map_retry_ratio) as usize);
                let prompt = fit_prompt(
                    SYSTEM_PROMPT,
                    self.template,
                    truncate_chars(chunk, keep),
                    self.directive,
                    self.config.target_ctx,
                    fit,
                );
                self.generator
                    .generate(&prompt, self.config.map_max_tokens)
                    .await?
            }
            Err(e) => return Err(e),
        };

        Ok(normalize_bullets(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGenerator;
    use crate::types::progress::NoProgress;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_map_normalizes_each_chunk_in_order() {
        let mock = MockGenerator::new()
            .with_response("eerste", "* feit een")
            .with_response("tweede", "1) feit twee");
        let config = SummarizerConfig::default();
        let stage = MapStage::new(&mock, &config, "Vat samen.", "Alleen bullets.");

        let chunks = vec!["eerste stuk".to_string(), "tweede stuk".to_string()];
        let partials = stage.run(&chunks, &NoProgress).await.unwrap();

        assert_eq!(partials, vec!["- feit een", "- feit twee"]);
        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].prompt.contains("[TEKST]\neerste stuk\n</TEKST>"));
        assert_eq!(calls[0].max_tokens, config.map_max_tokens);
    }

    #[tokio::test]
    async fn test_map_retries_once_with_trimmed_chunk() {
        let mock = MockGenerator::new().with_default_response("- feit").fail_first(1);
        let config = SummarizerConfig::default();
        let stage = MapStage::new(&mock, &config, "Vat samen.", "");

        let events = Mutex::new(Vec::new());
        let sink = |e: &ProgressEvent| events.lock().unwrap().push(e.clone());
        let chunk = "x".repeat(1600);
        let out = stage.summarize_chunk(1, &chunk, &sink).await.unwrap();

        assert_eq!(out, "- feit");
        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].prompt_len < calls[0].prompt_len);
        assert!(calls[1].prompt.contains(&"x".repeat(1200)));
        assert!(!calls[1].prompt.contains(&"x".repeat(1201)));
        assert!(events.lock().unwrap().contains(&ProgressEvent::MapRetry { index: 1 }));
    }

    #[tokio::test]
    async fn test_map_failure_after_retry_propagates() {
        let mock = MockGenerator::new().with_default_response("- feit").fail_first(2);
        let config = SummarizerConfig::default();
        let stage = MapStage::new(&mock, &config, "Vat samen.", "");

        let chunks = vec!["stuk".to_string()];
        let err = stage.run(&chunks, &NoProgress).await.unwrap_err();
        assert!(err.is_generation());
        assert_eq!(mock.calls().len(), 2);
    }
}
