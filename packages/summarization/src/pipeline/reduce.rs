//! REDUCE stage: merge MAP partials into one text.

use std::time::Instant;
use tracing::{debug, info};

use crate::classify::normalize::truncate_chars;
use crate::error::Result;
use crate::pipeline::output::normalize_reduce_text;
use crate::pipeline::prompts::{
    estimate_tokens, format_instruction, format_reduce_message, DEFAULT_REDUCE_HEADER,
    SYSTEM_PROMPT,
};
use crate::traits::generator::Generator;
use crate::types::config::SummarizerConfig;
use crate::types::progress::{emit_safely, ProgressEvent, ProgressSink};

/// Merges partials with a category's REDUCE template.
///
/// An empty template means the category is MAP-only: partials are joined
/// as they are and no generation call is made.
pub struct ReduceStage<'a, G: ?Sized> {
    generator: &'a G,
    config: &'a SummarizerConfig,
    template: &'a str,
    directive: &'a str,
}

impl<'a, G: Generator + ?Sized> ReduceStage<'a, G> {
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

    /// Reduce `partials` to a single text.
    pub async fn run(&self, partials: Vec<String>, progress: &dyn ProgressSink) -> Result<String> {
        if self.template.trim().is_empty() {
            emit_safely(progress, ProgressEvent::ReduceSkipped);
            let merged = partials
                .iter()
                .filter(|p| !p.trim().is_empty())
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n");
            return Ok(normalize_reduce_text(merged.trim()));
        }

        let mut partials = partials;
        if partials.len() == 1 {
            emit_safely(progress, ProgressEvent::ReduceSingle);
            partials = vec![self.reduce_group(&partials).await?];
        } else {
            let group_size = self.config.effective_group_size();
            let mut round = 0;
            while partials.len() > 1 {
                round += 1;
                emit_safely(
                    progress,
                    ProgressEvent::ReduceRoundStarted {
                        round,
                        partials: partials.len(),
                        group_size,
                    },
                );
                let started = Instant::now();

                let mut merged = Vec::with_capacity(partials.len().div_ceil(group_size));
                for group in partials.chunks(group_size) {
                    merged.push(self.reduce_group(group).await?);
                }
                info!(round, from = partials.len(), to = merged.len(), "reduce round done");
                partials = merged;

                emit_safely(
                    progress,
                    ProgressEvent::ReduceRoundDone {
                        round,
                        partials: partials.len(),
                        elapsed: started.elapsed(),
                    },
                );
            }
        }

        Ok(normalize_reduce_text(
            partials.first().map(String::as_str).unwrap_or_default(),
        ))
    }

    /// Merge one group of partials with a single generation call.
    ///
    /// When the prompt overflows the context, every item is capped to 85%
    /// of the current cap until items are short; after that the group is
    /// halved, keeping its first items.
    pub async fn reduce_group(&self, partials: &[String]) -> Result<String> {
        let header = match self.template.trim() {
            "" => DEFAULT_REDUCE_HEADER,
            header => header,
        };

        let mut parts: Vec<String> = partials
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if parts.is_empty() {
            return Ok(String::new());
        }

        let fit = &self.config.fit;
        let limit = (self.config.target_ctx as f64 * fit.ctx_fill_ratio) as usize;
        let build = |parts: &[String]| {
            format_instruction(
                SYSTEM_PROMPT,
                &format_reduce_message(header, parts, self.directive),
            )
        };

        let mut prompt = build(parts.as_slice());
        let mut item_cap = parts.iter().map(|p| p.chars().count()).max().unwrap_or(0);
        while estimate_tokens(&prompt, fit) > limit {
            if item_cap > fit.reduce_item_min_chars {
                item_cap = (item_cap as f64 * fit.reduce_item_shrink_ratio) as usize;
                parts = parts
                    .iter()
                    .map(|p| truncate_chars(p, item_cap).trim().to_string())
                    .collect();
            } else if parts.len() > 1 {
                let keep = (parts.len() / 2).max(1);
                parts.truncate(keep);
            } else {
                break;
            }
            debug!(items = parts.len(), item_cap, "shrinking reduce prompt");
            prompt = build(parts.as_slice());
        }

        let output = self
            .generator
            .generate(&prompt, self.config.reduce_max_tokens)
            .await?;
        Ok(normalize_reduce_text(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGenerator;
    use crate::types::progress::NoProgress;
    use std::sync::Mutex;

    fn partials(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("- feit {}", i)).collect()
    }

    #[tokio::test]
    async fn test_empty_template_joins_partials_without_generation() {
        let mock = MockGenerator::new().with_default_response("nooit");
        let config = SummarizerConfig::default();
        let stage = ReduceStage::new(&mock, &config, "  ", "");

        let input = vec!["- a".to_string(), "  ".to_string(), "- b".to_string()];
        let out = stage.run(input, &NoProgress).await.unwrap();

        assert_eq!(out, "- a\n- b");
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_partial_is_reduced_once() {
        let mock = MockGenerator::new().with_default_response("Eindtekst: Betrokkene werd aangehouden.");
        let config = SummarizerConfig::default();
        let stage = ReduceStage::new(&mock, &config, "Schrijf een tekst.", "Geen meta.");

        let out = stage.run(partials(1), &NoProgress).await.unwrap();
        assert_eq!(out, "Betrokkene werd aangehouden.");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.contains("Schrijf een tekst.\n\nDEELSAMENVATTINGEN:\n1)\n- feit 1\n\nGeen meta."));
        assert_eq!(calls[0].max_tokens, config.reduce_max_tokens);
    }

    #[tokio::test]
    async fn test_rounds_group_until_one_remains() {
        let mock = MockGenerator::new().with_default_response("samengevoegd");
        let config = SummarizerConfig::default().with_group_size(2);
        let stage = ReduceStage::new(&mock, &config, "Schrijf.", "");

        let events = Mutex::new(Vec::new());
        let sink = |e: &ProgressEvent| events.lock().unwrap().push(e.clone());
        let out = stage.run(partials(5), &sink).await.unwrap();

        assert_eq!(out, "samengevoegd");
        // 5 -> 3 -> 2 -> 1
        assert_eq!(mock.calls().len(), 3 + 2 + 1);

        let rounds: Vec<(usize, usize)> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::ReduceRoundStarted { round, partials, .. } => Some((*round, *partials)),
                _ => None,
            })
            .collect();
        assert_eq!(rounds, vec![(1, 5), (2, 3), (3, 2)]);
    }

    #[tokio::test]
    async fn test_group_without_content_skips_generation() {
        let mock = MockGenerator::new().with_default_response("x");
        let config = SummarizerConfig::default();
        let stage = ReduceStage::new(&mock, &config, "Schrijf.", "");

        let out = stage.reduce_group(&["  ".to_string()]).await.unwrap();
        assert_eq!(out, "");
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_group_is_capped_to_fit() {
        let mock = MockGenerator::new().with_default_response("kort");
        let config = SummarizerConfig::default().with_target_ctx(1024);
        let stage = ReduceStage::new(&mock, &config, "Schrijf.", "");

        let long = vec!["a".repeat(3000), "b".repeat(3000)];
        stage.reduce_group(&long).await.unwrap();

        let calls = mock.calls();
        let limit = (1024.0 * config.fit.ctx_fill_ratio) as usize;
        assert!(estimate_tokens(&calls[0].prompt, &config.fit) <= limit);
        assert!(calls[0].prompt.contains("1)\na"));
        assert!(calls[0].prompt.contains("2)\nb"));
    }
}
