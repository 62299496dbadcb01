//! Phrase/token rule tables used by the classifier.
//!
//! Built-in defaults cover the default category set. An optional JSON
//! override file can add phrases and tokens per category; overrides are
//! appended to the defaults, never replacing them.

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Result, SummarizationError};
use crate::types::category::{CategoryCode, CategorySet};

/// Phrases and tokens that signal one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Matched as whole words or word runs of the normalized text. A
    /// trailing `*` lets the last word continue, so `risic*` hits "risico".
    pub phrases: Vec<String>,

    /// Matched as standalone words of the normalized text.
    pub tokens: Vec<String>,
}

impl RuleEntry {
    pub fn new(
        phrases: impl IntoIterator<Item = impl Into<String>>,
        tokens: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            phrases: dedupe_keep_order(phrases.into_iter().map(Into::into)),
            tokens: dedupe_keep_order(tokens.into_iter().map(Into::into)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty() && self.tokens.is_empty()
    }

    /// Append another entry's phrases and tokens, dropping duplicates.
    pub fn merged_with(&self, extra: &RuleEntry) -> RuleEntry {
        RuleEntry::new(
            self.phrases.iter().chain(extra.phrases.iter()).cloned(),
            self.tokens.iter().chain(extra.tokens.iter()).cloned(),
        )
    }
}

fn dedupe_keep_order(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.trim();
        if item.is_empty() || out.iter().any(|seen| seen == item) {
            continue;
        }
        out.push(item.to_string());
    }
    out
}

struct BaseRule {
    code: &'static str,
    phrases: &'static [&'static str],
    tokens: &'static [&'static str],
}

impl BaseRule {
    fn to_entry(&self) -> RuleEntry {
        RuleEntry::new(self.phrases.iter().copied(), self.tokens.iter().copied())
    }
}

const DEFAULT_RULES: &[BaseRule] = &[
    BaseRule {
        code: "TLL",
        phrases: &[
            "ervan verdacht wordt",
            "tenlastelegging",
            "ten laste gelegd",
            "vordering tot inbewaringstelling",
            "vordering inbewaringstelling",
            "inbewaringstelling",
            "in bewaringstelling",
            "vordering bewaring",
            "vordering ibs",
            "vord ibs",
            "vordibs",
        ],
        tokens: &["tll", "ibs"],
    },
    BaseRule {
        code: "UJD",
        phrases: &[
            "uittreksel justitiele documentatie",
            "justitiele documentatie",
            "openstaande zaken betreffende misdrijven",
            "volledig afgedane zaken betreffende misdrijven",
        ],
        tokens: &["ujd"],
    },
    BaseRule {
        code: "RECLASS",
        phrases: &[
            "reclasseringsrapport",
            "reclasseringsadvies",
            "reclassering nederland",
            "ggz reclassering",
            "toezicht*",
            "meldplicht",
            "voortgangsrapportage",
            "adviesrapportage",
            "risic*",
            "risc*",
            "vroeghulp",
        ],
        tokens: &["reclass", "recl"],
    },
    BaseRule {
        code: "VC",
        phrases: &[
            "voorgeleidingsconsult",
            "voor geleidingsconsult",
            "voorgeleiding",
            "voor geleiding",
            "nifp consult",
            "nifpconsult",
            "nifp consulent",
            "consulent",
            "pro justitia consult",
            "projustitia consult",
            "trajectconsult",
            "verhoor raadkamer",
            "stukken rc",
            "rechter commissaris",
            "rechter-commissaris",
            "psychiatrisch consult",
            "psychologisch consult",
            "gz psycholoog",
            "psychiater",
            "psycholoog",
        ],
        tokens: &["vc", "vgc"],
    },
    BaseRule {
        code: "PV",
        phrases: &[
            "proces verbaal",
            "proces-verbaal",
            "procesverbaal",
            "proces verbaal van bevindingen",
            "proces verbaal van aangifte",
            "proces verbaal van verhoor",
            "proces verbaal van voorgeleiding",
            "pv vgl",
            "pvvgl",
            "aangifte",
            "verbalisant",
            "getuige",
        ],
        tokens: &["pv"],
    },
    BaseRule {
        code: "PJ",
        phrases: &[
            "rapport pro justitia",
            "rapportage pro justitia",
            "pro justitia rapport",
            "projustitia rapport",
            "dubbellrapport pro justitia",
            "monorapportage pro justitia",
            "toerekeningsvatbaarheid",
            "toerekeningsvatbaar",
            "risicotaxatie",
            "recidiverisico",
            "dsm",
            "wais",
            "pcl r",
        ],
        tokens: &["pj"],
    },
];

fn base_rule(code: &str) -> Option<&'static BaseRule> {
    DEFAULT_RULES.iter().find(|rule| rule.code == code)
}

/// Built-in rule for `code`, inheriting from the closest base category
/// for variant codes such as `OUD_PJ` or `RECL_ADVIES`.
pub fn default_rule_for(code: &str) -> RuleEntry {
    let code = code.to_uppercase();
    let base = if let Some(rule) = base_rule(&code) {
        Some(rule)
    } else if code.contains("RECLASS") || code.starts_with("RECL") {
        base_rule("RECLASS")
    } else if code.contains("UJD") {
        base_rule("UJD")
    } else if code.contains("TLL") || code.contains("IBS") {
        base_rule("TLL")
    } else if code.contains("PV") {
        base_rule("PV")
    } else if code.contains("VC") || code.contains("VGC") {
        base_rule("VC")
    } else if code.contains("PJ") {
        base_rule("PJ")
    } else {
        None
    };
    base.map(BaseRule::to_entry).unwrap_or_default()
}

/// Extra rules loaded from an override file, keyed by uppercase code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOverrides {
    entries: HashMap<String, RuleEntry>,
}

impl RuleOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an override document.
    ///
    /// The document must be a JSON object. Entries that are not objects are
    /// skipped, as are `phrases`/`tokens` fields that are not lists.
    /// Non-string list items are stringified.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| SummarizationError::Rules(format!("invalid JSON: {}", e)))?;
        let Value::Object(map) = value else {
            return Err(SummarizationError::Rules(
                "override document must be a JSON object".to_string(),
            ));
        };

        let mut entries = HashMap::new();
        for (code, entry) in map {
            let Value::Object(fields) = entry else {
                warn!(category = %code, "skipping malformed rule entry");
                continue;
            };
            let phrases = string_list(&code, "phrases", fields.get("phrases"));
            let tokens = string_list(&code, "tokens", fields.get("tokens"));
            entries.insert(code.to_uppercase(), RuleEntry::new(phrases, tokens));
        }

        debug!(categories = entries.len(), "parsed rule overrides");
        Ok(Self { entries })
    }

    /// Load overrides from a file. A missing file yields no overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = fs::read_to_string(path)
            .map_err(|e| SummarizationError::Rules(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Like [`RuleOverrides::load`], but any failure yields no overrides.
    pub fn load_lenient(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(overrides) => overrides,
            Err(e) => {
                warn!(path = %path.as_ref().display(), error = %e, "ignoring rule override file");
                Self::new()
            }
        }
    }

    /// Add or extend the override for one category.
    pub fn with(mut self, code: impl AsRef<str>, entry: RuleEntry) -> Self {
        let code = code.as_ref().to_uppercase();
        let merged = match self.entries.get(&code) {
            Some(existing) => existing.merged_with(&entry),
            None => entry,
        };
        self.entries.insert(code, merged);
        self
    }

    pub fn get(&self, code: &str) -> Option<&RuleEntry> {
        self.entries.get(code)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn string_list(code: &str, field: &str, value: Option<&Value>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(_) => {
            warn!(category = %code, field, "ignoring non-list rule field");
            Vec::new()
        }
    }
}

/// Merged rule table: one entry per allowed category, in category order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    entries: Vec<(CategoryCode, RuleEntry)>,
}

impl RuleTable {
    /// Built-in defaults merged with `overrides` for every category in `categories`.
    pub fn build(categories: &CategorySet, overrides: &RuleOverrides) -> Self {
        let entries = categories
            .iter()
            .map(|code| {
                let base = default_rule_for(code.as_str());
                let entry = match overrides.get(code.as_str()) {
                    Some(extra) => base.merged_with(extra),
                    None => base,
                };
                (code.clone(), entry)
            })
            .collect();
        Self { entries }
    }

    /// Built-in defaults only.
    pub fn defaults(categories: &CategorySet) -> Self {
        Self::build(categories, &RuleOverrides::new())
    }

    pub fn get(&self, code: &str) -> Option<&RuleEntry> {
        self.entries
            .iter()
            .find(|(c, _)| c.as_str() == code)
            .map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryCode, &RuleEntry)> {
        self.entries.iter().map(|(code, entry)| (code, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RuleTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(code, entry)| (code.as_str(), entry)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_allowed_category_gets_an_entry() {
        let categories = CategorySet::new(["PV", "XYZ"]);
        let table = RuleTable::defaults(&categories);
        assert_eq!(table.len(), 2);
        assert!(table.get("PV").unwrap().tokens.contains(&"pv".to_string()));
        assert!(table.get("XYZ").unwrap().is_empty());
    }

    #[test]
    fn test_variant_codes_inherit_base_rules() {
        assert_eq!(default_rule_for("OUD_PJ"), default_rule_for("PJ"));
        assert_eq!(default_rule_for("RECL_ADVIES"), default_rule_for("RECLASS"));
        assert_eq!(default_rule_for("IBS"), default_rule_for("TLL"));
        assert_eq!(default_rule_for("VGC"), default_rule_for("VC"));
        assert!(default_rule_for("OVERIG").is_empty());
    }

    #[test]
    fn test_overrides_append_without_duplicates() {
        let overrides = RuleOverrides::from_json_str(
            r#"{"pv": {"phrases": ["aangifte", "bevindingen"], "tokens": ["bvh", 7]}}"#,
        )
        .unwrap();
        let table = RuleTable::build(&CategorySet::new(["PV"]), &overrides);
        let pv = table.get("PV").unwrap();

        assert_eq!(pv.phrases.first().map(String::as_str), Some("proces verbaal"));
        assert_eq!(pv.phrases.iter().filter(|p| *p == "aangifte").count(), 1);
        assert_eq!(pv.phrases.last().map(String::as_str), Some("bevindingen"));
        assert_eq!(pv.tokens, vec!["pv", "bvh", "7"]);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let overrides = RuleOverrides::from_json_str(
            r#"{"PV": "nope", "VC": {"phrases": "not a list", "tokens": ["vgc2"]}}"#,
        )
        .unwrap();
        assert!(overrides.get("PV").is_none());
        let vc = overrides.get("VC").unwrap();
        assert!(vc.phrases.is_empty());
        assert_eq!(vc.tokens, vec!["vgc2"]);
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        assert!(matches!(
            RuleOverrides::from_json_str("[1, 2]"),
            Err(SummarizationError::Rules(_))
        ));
        assert!(RuleOverrides::from_json_str("{oops").is_err());
    }

    #[test]
    fn test_missing_file_is_empty_and_bad_file_is_lenient() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("rules.json");
        assert!(RuleOverrides::load(&missing).unwrap().is_empty());

        std::fs::write(&missing, "not json").unwrap();
        assert!(RuleOverrides::load(&missing).is_err());
        assert!(RuleOverrides::load_lenient(&missing).is_empty());
    }

    #[test]
    fn test_unreadable_or_invalid_file_is_a_rules_error() {
        let dir = tempfile::tempdir().unwrap();
        // a directory exists but cannot be read as a file
        assert!(matches!(
            RuleOverrides::load(dir.path()),
            Err(SummarizationError::Rules(_))
        ));

        let path = dir.path().join("rules.json");
        std::fs::write(&path, "{oops").unwrap();
        let err = RuleOverrides::load(&path).unwrap_err();
        assert!(matches!(err, SummarizationError::Rules(_)));
        assert!(err.to_string().starts_with("rules error: invalid JSON"));
    }

    #[test]
    fn test_table_serializes_in_category_order() {
        let table = RuleTable::defaults(&CategorySet::new(["VC", "PJ"]));
        let json = serde_json::to_string(&table).unwrap();
        let vc = json.find("\"VC\"").unwrap();
        let pj = json.find("\"PJ\"").unwrap();
        assert!(vc < pj);
    }
}
