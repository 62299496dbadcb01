//! Category codes - the closed label set that drives templates,
//! extraction rules and redaction branches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catch-all code used when a document cannot be classified.
pub const UNKNOWN: &str = "UNKNOWN";

/// Default allowed categories when no configuration is supplied.
pub const DEFAULT_CATEGORIES: &[&str] = &["PJ", "PV", "RECLASS", "TLL", "UJD", "VC"];

/// A document category code.
///
/// Always uppercase and never empty: blank input becomes [`UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CategoryCode(String);

impl CategoryCode {
    /// Create a code, uppercasing and trimming the input.
    pub fn new(code: impl AsRef<str>) -> Self {
        let code = code.as_ref().trim().to_uppercase();
        if code.is_empty() {
            Self::unknown()
        } else {
            Self(code)
        }
    }

    /// The catch-all code.
    pub fn unknown() -> Self {
        Self(UNKNOWN.to_string())
    }

    /// Parse an optional code, defaulting to UNKNOWN.
    pub fn from_option(code: Option<&str>) -> Self {
        code.map(Self::new).unwrap_or_else(Self::unknown)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN
    }

    /// Behavior family for category-specific processing.
    pub fn kind(&self) -> CategoryKind {
        match self.0.as_str() {
            "TLL" => CategoryKind::ChargeSheet,
            "UJD" => CategoryKind::RecordExtract,
            "PV" => CategoryKind::PoliceReport,
            _ => CategoryKind::General,
        }
    }
}

impl Default for CategoryCode {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CategoryCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl From<&str> for CategoryCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<CategoryCode> for String {
    fn from(code: CategoryCode) -> Self {
        code.0
    }
}

impl PartialEq<str> for CategoryCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CategoryCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Processing family a category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    /// Charge sheet / custody request (TLL): slice to the charges.
    ChargeSheet,

    /// Criminal-record extract (UJD): slice to the case headings, trim legal detail.
    RecordExtract,

    /// Police report (PV): boilerplate stripping, Q/A and table compaction.
    PoliceReport,

    /// Everything else.
    General,
}

/// The configured set of detectable categories.
///
/// Ordered, uppercase, de-duplicated, and never containing UNKNOWN
/// (UNKNOWN is always an implicit fallback, never a detection target).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySet {
    codes: Vec<CategoryCode>,
}

impl CategorySet {
    pub fn new(codes: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        let mut out: Vec<CategoryCode> = Vec::new();
        for code in codes {
            if code.as_ref().trim().is_empty() {
                continue;
            }
            let code = CategoryCode::new(code);
            if code.is_unknown() || out.contains(&code) {
                continue;
            }
            out.push(code);
        }
        Self { codes: out }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c.as_str() == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryCode> {
        self.codes.iter()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORIES.iter().copied())
    }
}
