pub mod classify;
pub mod rules;
pub mod summarize;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read an already extracted plain-text document.
pub fn read_document(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Name used for filename-based classification.
pub fn document_name(path: &Path, name: Option<String>) -> String {
    name.unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    })
}
