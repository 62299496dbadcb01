//! Templates read from a prompt directory.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, SummarizationError};
use crate::traits::template::{TemplatePair, TemplateSource};
use crate::types::category::{CategoryCode, UNKNOWN};

/// Reads `<code lowercase>.txt` from a directory, falling back to
/// `unknown.txt` when a category has no file of its own.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    dir: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, code: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", code.to_lowercase()))
    }
}

impl TemplateSource for DirectoryTemplates {
    fn load(&self, category: &CategoryCode) -> Result<TemplatePair> {
        let mut path = self.path_for(category.as_str());
        if !path.is_file() {
            path = self.path_for(UNKNOWN);
        }

        debug!(category = %category, path = %path.display(), "loading templates");

        let bytes = fs::read(&path).map_err(|e| SummarizationError::Template {
            category: category.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })?;

        Ok(TemplatePair::parse(&String::from_utf8_lossy(&bytes)))
    }
}
