//! Template source implementations.
//!
//! - [`DirectoryTemplates`] - one `<code>.txt` file per category on disk
//! - [`BuiltinTemplates`] - templates compiled into the binary
//! - [`MemoryTemplates`] - in-memory map, for tests and embedding callers

pub mod builtin;
pub mod directory;

pub use builtin::BuiltinTemplates;
pub use directory::DirectoryTemplates;

use std::collections::HashMap;

use crate::error::{Result, SummarizationError};
use crate::traits::template::{TemplatePair, TemplateSource};
use crate::types::category::{CategoryCode, UNKNOWN};

/// In-memory templates keyed by category code.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplates {
    templates: HashMap<String, TemplatePair>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template pair for a category.
    pub fn with(mut self, category: impl AsRef<str>, pair: TemplatePair) -> Self {
        self.templates
            .insert(CategoryCode::new(category).as_str().to_string(), pair);
        self
    }

    /// Register a raw template blob (split on the separator line).
    pub fn with_text(self, category: impl AsRef<str>, text: &str) -> Self {
        self.with(category, TemplatePair::parse(text))
    }
}

impl TemplateSource for MemoryTemplates {
    fn load(&self, category: &CategoryCode) -> Result<TemplatePair> {
        self.templates
            .get(category.as_str())
            .or_else(|| self.templates.get(UNKNOWN))
            .cloned()
            .ok_or_else(|| SummarizationError::Template {
                category: category.to_string(),
                reason: "no template and no UNKNOWN fallback".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_templates_fall_back_to_unknown() {
        let templates = MemoryTemplates::new()
            .with_text("pv", "PV map\n---REDUCE---\nPV reduce")
            .with_text("UNKNOWN", "Generic map");

        let pv = templates.load(&CategoryCode::new("PV")).unwrap();
        assert_eq!(pv.reduce, "PV reduce");

        let vc = templates.load(&CategoryCode::new("VC")).unwrap();
        assert_eq!(vc.map, "Generic map");
        assert!(!vc.has_reduce());
    }

    #[test]
    fn test_memory_templates_without_fallback_error() {
        let templates = MemoryTemplates::new();
        let err = templates.load(&CategoryCode::new("PV")).unwrap_err();
        assert!(matches!(err, SummarizationError::Template { .. }));
    }
}
