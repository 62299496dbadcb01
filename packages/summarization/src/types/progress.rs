//! Progress events emitted while a document is summarized.
//!
//! Emission is fire-and-forget: a sink that fails (or panics) never
//! aborts the pipeline.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use super::category::CategoryCode;

/// A discrete pipeline step, reported after it starts or completes.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Text prepared and chunked.
    Started {
        category: CategoryCode,
        chunks: usize,
        max_chars: usize,
        ctx: usize,
        reduce: bool,
    },

    /// Fast mode truncated the chunk list.
    FastMode { chunks: usize },

    MapStarted { index: usize, total: usize },

    /// First MAP attempt failed; retrying with a trimmed chunk.
    MapRetry { index: usize },

    MapDone {
        index: usize,
        total: usize,
        elapsed: Duration,
    },

    /// MAP partials beyond the configured cap were dropped.
    PartialsTrimmed { from: usize, to: usize },

    /// A single partial is reduced once for style normalization.
    ReduceSingle,

    ReduceRoundStarted {
        round: usize,
        partials: usize,
        group_size: usize,
    },

    ReduceRoundDone {
        round: usize,
        partials: usize,
        elapsed: Duration,
    },

    /// No reduce template: MAP bullets are merged without generation.
    ReduceSkipped,

    /// Post-processing left too little text; redoing it from the raw summary.
    FallbackFromRaw,

    /// Leakage detected; running the corrective pass.
    Repair,

    /// Output still too short; repairing from the raw summary.
    RepairFromRaw,

    /// A repair pass failed; best-effort output kept.
    RepairFailed,

    /// Nothing left to summarize after preparation.
    NoText,

    Finished,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started {
                category,
                chunks,
                max_chars,
                ctx,
                reduce,
            } => write!(
                f,
                "DocType={} | chunks={} | max_chars_per_chunk={} | ctx={} | reduce={}",
                category,
                chunks,
                max_chars,
                ctx,
                if *reduce { "yes" } else { "no" }
            ),
            Self::FastMode { chunks } => {
                write!(f, "FAST_MODE enabled | processing first {} chunk(s)", chunks)
            }
            Self::MapStarted { index, total } => write!(f, "MAP {}/{} started", index, total),
            Self::MapRetry { index } => write!(f, "MAP {} error | retrying with trimmed chunk", index),
            Self::MapDone {
                index,
                total,
                elapsed,
            } => write!(
                f,
                "MAP {}/{} done ({:.1}s)",
                index,
                total,
                elapsed.as_secs_f64()
            ),
            Self::PartialsTrimmed { from, to } => write!(f, "Trimming partials: {} -> {}", from, to),
            Self::ReduceSingle => f.write_str("REDUCE single-pass (1 partial)"),
            Self::ReduceRoundStarted {
                round,
                partials,
                group_size,
            } => write!(
                f,
                "REDUCE round {} started | partials={} | group_size={}",
                round, partials, group_size
            ),
            Self::ReduceRoundDone {
                round,
                partials,
                elapsed,
            } => write!(
                f,
                "REDUCE round {} done ({:.1}s) | new_partials={}",
                round,
                elapsed.as_secs_f64(),
                partials
            ),
            Self::ReduceSkipped => f.write_str("No REDUCE template; returning merged MAP bullets."),
            Self::FallbackFromRaw => f.write_str(
                "Post-process produced empty/too short output; applying fallback from raw summary",
            ),
            Self::Repair => f.write_str("REPAIR pass: cleaning meta/PII leakage"),
            Self::RepairFromRaw => {
                f.write_str("Final output still empty/too short; REPAIR from raw summary")
            }
            Self::RepairFailed => f.write_str("REPAIR pass failed (continuing with best-effort output)"),
            Self::NoText => f.write_str("No text found after extraction/sanitize."),
            Self::Finished => f.write_str("Summarization finished."),
        }
    }
}

/// Receiver of progress events.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: &ProgressEvent) {
        self(event)
    }
}

impl ProgressSink for UnboundedSender<ProgressEvent> {
    fn emit(&self, event: &ProgressEvent) {
        // A dropped receiver is not the pipeline's problem.
        let _ = self.send(event.clone());
    }
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _event: &ProgressEvent) {}
}

/// Deliver an event, swallowing any panic raised by the sink.
pub(crate) fn emit_safely(sink: &dyn ProgressSink, event: ProgressEvent) {
    if catch_unwind(AssertUnwindSafe(|| sink.emit(&event))).is_err() {
        warn!(event = %event, "progress sink panicked; event dropped");
    }
}
