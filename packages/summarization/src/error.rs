//! Typed errors for the summarization library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur while summarizing a document.
#[derive(Debug, Error)]
pub enum SummarizationError {
    /// Text generation backend unavailable or failed
    #[error("generation error: {0}")]
    Generation(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Prompt template missing or unreadable
    #[error("template error for {category}: {reason}")]
    Template { category: String, reason: String },

    /// Rule override file could not be read or parsed
    #[error("rules error: {0}")]
    Rules(String),

    /// Invalid configuration value
    #[error("config error: {0}")]
    Config(String),
}

impl SummarizationError {
    /// Wrap any backend error as a generation failure.
    pub fn generation(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Generation(err.into())
    }

    /// Whether this error came from the generation backend.
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }
}

/// Result type alias for summarization operations.
pub type Result<T> = std::result::Result<T, SummarizationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_helper_accepts_strings() {
        let err = SummarizationError::generation("model not loaded");
        assert!(err.is_generation());
        assert_eq!(err.to_string(), "generation error: model not loaded");
    }

    #[test]
    fn test_template_error_message() {
        let err = SummarizationError::Template {
            category: "PV".to_string(),
            reason: "missing file".to_string(),
        };
        assert!(!err.is_generation());
        assert!(err.to_string().contains("PV"));
    }
}
