//! Template source trait and the MAP/REDUCE template pair.

use crate::error::Result;
use crate::types::category::CategoryCode;

/// Literal line separating the MAP section from the REDUCE section.
pub const REDUCE_SEPARATOR: &str = "---REDUCE---";

/// MAP and REDUCE instructions for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplatePair {
    pub map: String,

    /// Empty means "MAP only": bullets are concatenated, no reduce pass.
    pub reduce: String,
}

impl TemplatePair {
    pub fn new(map: impl Into<String>, reduce: impl Into<String>) -> Self {
        Self {
            map: map.into(),
            reduce: reduce.into(),
        }
    }

    /// Split a template blob on the separator line.
    ///
    /// Without a separator the whole blob is the MAP template.
    pub fn parse(text: &str) -> Self {
        let text = text.replace("\r\n", "\n");
        let sep = format!("\n{}\n", REDUCE_SEPARATOR);
        match text.split_once(&sep) {
            Some((map, reduce)) => Self::new(map.trim(), reduce.trim()),
            None => Self::new(text.trim(), ""),
        }
    }

    pub fn has_reduce(&self) -> bool {
        !self.reduce.trim().is_empty()
    }
}

/// Provider of per-category prompt templates.
pub trait TemplateSource: Send + Sync {
    /// Load the template pair for `category`, falling back to the UNKNOWN
    /// templates when the category has none of its own.
    fn load(&self, category: &CategoryCode) -> Result<TemplatePair>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_separator() {
        let pair = TemplatePair::parse("Vat samen.\r\n---REDUCE---\r\nCombineer.\r\n");
        assert_eq!(pair.map, "Vat samen.");
        assert_eq!(pair.reduce, "Combineer.");
        assert!(pair.has_reduce());
    }

    #[test]
    fn test_parse_without_separator_is_map_only() {
        let pair = TemplatePair::parse("  Alleen bullets.\n");
        assert_eq!(pair.map, "Alleen bullets.");
        assert!(!pair.has_reduce());
    }

    #[test]
    fn test_separator_must_be_its_own_line() {
        let pair = TemplatePair::parse("Tekst met ---REDUCE--- erin");
        assert!(!pair.has_reduce());
    }
}
