//! Application context with shared state and utilities

use console::style;
use std::env;
use std::path::PathBuf;

use summarization::{CategorySet, Classifier, ProgressEvent, RuleOverrides};

/// Application context passed to all commands
pub struct AppContext {
    pub quiet: bool,
    pub categories: CategorySet,
    pub overrides: RuleOverrides,
}

impl AppContext {
    /// Resolve categories and rule overrides from flags, then the environment.
    ///
    /// A missing or malformed rules file is logged and ignored.
    pub fn new(quiet: bool, rules: Option<PathBuf>, categories: Vec<String>) -> Self {
        let categories = if categories.is_empty() {
            match env::var("FS_CATEGORIES") {
                Ok(list) if !list.trim().is_empty() => CategorySet::new(list.split(',')),
                _ => CategorySet::default(),
            }
        } else {
            CategorySet::new(categories)
        };

        let overrides = rules
            .or_else(|| env::var_os("FS_RULES_FILE").map(PathBuf::from))
            .map(RuleOverrides::load_lenient)
            .unwrap_or_default();

        Self {
            quiet,
            categories,
            overrides,
        }
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.categories.clone()).with_overrides(&self.overrides)
    }

    pub fn print_header(&self, msg: &str) {
        if !self.quiet {
            eprintln!();
            eprintln!("{}", style(msg).bold());
        }
    }

    pub fn print_success(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", style(msg).green());
        }
    }

    pub fn print_warning(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", style(msg).yellow());
        }
    }

    pub fn print_info(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", style(msg).cyan());
        }
    }

    /// One line per pipeline event; fallbacks and failures stand out.
    pub fn print_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::FallbackFromRaw
            | ProgressEvent::Repair
            | ProgressEvent::RepairFromRaw
            | ProgressEvent::RepairFailed
            | ProgressEvent::NoText => self.print_warning(&event.to_string()),
            ProgressEvent::Finished => self.print_success(&event.to_string()),
            _ => self.print_info(&event.to_string()),
        }
    }
}
