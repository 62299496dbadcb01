//! Forensic Document Summarization Library
//!
//! Classifies Dutch forensic case documents (charge sheets, police reports,
//! criminal-record extracts, probation and psychological reports) and turns
//! their extracted text into an anonymized, professional summary with a
//! MAP-REDUCE pass over a local language model.
//!
//! # Design Philosophy
//!
//! - Privacy first: identifiers are redacted before the model sees the
//!   text and again after it answers
//! - The model is a capability, not a dependency: one `Generator` trait
//! - Best-effort cleanup never turns a usable summary into an error
//! - Every tuned constant is configuration
//!
//! # Usage
//!
//! ```rust,ignore
//! use summarization::{classify, BuiltinTemplates, CategorySet, Summarizer};
//! use summarization::testing::MockGenerator;
//!
//! let categories = CategorySet::default();
//! let category = classify("PV 2024.pdf", &text, &categories);
//!
//! let summarizer = Summarizer::new(MockGenerator::new(), BuiltinTemplates);
//! let summary = summarizer.summarize(Some(category.as_str()), &text).await?;
//! ```
//!
//! # Modules
//!
//! - [`classify`] - Rule-based category detection
//! - [`prepare`] - Category-specific text preparation
//! - [`privacy`] - PII detection, redaction and name scrubbing
//! - [`pipeline`] - Chunking, MAP, REDUCE, repair and orchestration
//! - [`templates`] - Prompt template sources
//! - [`traits`] - Core trait abstractions (Generator, TemplateSource)
//! - [`testing`] - Mock implementations for testing

pub mod classify;
pub mod error;
pub mod pipeline;
pub mod postprocess;
pub mod prepare;
pub mod privacy;
pub mod templates;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "http")]
pub mod generators;

// Re-export core types at crate root
pub use classify::{classify, Classification, ClassificationReason, Classifier, RuleOverrides};
pub use error::{Result, SummarizationError};
pub use traits::{
    generator::{Generator, SerializedGenerator, STOP_SEQUENCES},
    template::{TemplatePair, TemplateSource},
};
pub use types::{
    category::{CategoryCode, CategoryKind, CategorySet},
    config::{ClassifierConfig, FitConfig, PreparerConfig, SummarizerConfig},
    progress::{NoProgress, ProgressEvent, ProgressSink},
};

// Re-export pipeline entry points
pub use pipeline::{Summarizer, NO_TEXT_FOUND};
pub use prepare::{sanitize, TextPreparer};
pub use privacy::{pre_anonymize, redact_summary};
pub use templates::{BuiltinTemplates, DirectoryTemplates, MemoryTemplates};

#[cfg(feature = "http")]
pub use generators::HttpGenerator;
