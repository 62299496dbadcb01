use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use super::detector::{
    digit_count, is_identifier, ADDRESS_AFTER_PREPOSITION, AGE_PHRASE, AGE_WORD, BIRTH_CONTEXT,
    BSN, CASE_NUMBER, CASE_REFERENCE, DEVICE_ID, EMAIL, IMEI, IMEI_CONTEXT,
    INITIALS_PREFIX_SURNAME, INITIALS_SURNAME, NAMED_AS, NUMBERED_ROLE, PHONE, POLICE_REFERENCE,
    POSTCODE, STREET_WITH_SUFFIX,
};

pub const NAME_REMOVED: &str = "[naam verwijderd]";
pub const BIRTH_DATE_REMOVED: &str = "[geboortedatum verwijderd]";
pub const IDENTIFIER_REMOVED: &str = "[kenmerk verwijderd]";

lazy_static! {
    static ref LABEL_LINE: Regex = Regex::new(
        r"(?im)^\s*(voornamen|achternaam|geslachtsnaam|geboorteplaats|nationaliteit|skn|id(?:-)?nummer|documentnummer|paspoortnummer|rijbewijsnummer|onderzoeksnummer|proces-?verbaal(?:-)?nummer|pv-?nummer|zaak(?:-)?nummer|parket(?:-)?nummer|kenmerk|documentkenmerk)\s*:\s*.*$"
    ).unwrap();
    static ref BIRTH_LINE: Regex =
        Regex::new(r"(?im)^[^\n]*(geboortedatum|geb\.|geboren)[^\n]*$").unwrap();
    static ref BIRTH_LINE_START: Regex =
        Regex::new(r"(?im)^\s*(geboortedatum|geb\.|geboren)\b.*$").unwrap();
    static ref NUMERIC_DATE: Regex = Regex::new(r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b").unwrap();
    static ref WRITTEN_DATE: Regex = Regex::new(
        r"(?i)\b\d{1,2}\s+(?:januari|februari|maart|april|mei|juni|juli|augustus|september|oktober|november|december)\s+\d{4}\b"
    ).unwrap();
    static ref SALUTATION: Regex = Regex::new(
        r"\b((?i:de heer|mevrouw|dhr\.?|mw\.?|mr\.?|dr\.?|prof\.?))\s+([A-Z][a-zà-ÿ]+(?:[-\s][A-Z][a-zà-ÿ]+){0,3})\b"
    ).unwrap();
    static ref NAME_LABEL: Regex = Regex::new(
        r"(?m)((?i:naam)\s*[:/]\s*)([A-Z][a-zà-ÿ]{2,}(?:\s+[A-Z][a-zà-ÿ]{2,}){0,3})"
    ).unwrap();
    static ref SUSPECT: Regex = Regex::new(r"(?i)\b(verdachte|onderzochte)\b").unwrap();
    static ref AGED_PERSON: Regex =
        Regex::new(r"(?i)\b\d{1,3}\s*-?\s*jarige\s+(man|vrouw|persoon)\b").unwrap();
    static ref DOUBLE_SPACES: Regex = Regex::new(r"[ \t]{2,}").unwrap();
    static ref EXCESS_BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref TRAILING_SPACE: Regex = Regex::new(r"\s+\n").unwrap();
}

/// Outcome of redacting a generated summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionResult {
    pub text: String,
    pub changed: bool,
}

/// A single text-to-text redaction step.
pub type Rule = fn(&str) -> String;

/// Rules applied to source text before it reaches the model.
pub const PRE_GENERATION_RULES: &[(&str, Rule)] = &[
    ("label_lines", redact_label_lines),
    ("police_references", redact_police_references),
    ("birth_lines", redact_birth_lines),
    ("birth_dates_in_context", redact_birth_dates_in_context),
    ("salutations", redact_salutations),
    ("name_labels", redact_name_labels),
    ("initials_names", redact_initials_names),
    ("bsn", redact_bsn),
    ("emails", redact_emails),
    ("phones", redact_phones),
    ("postcodes", redact_postcodes),
    ("addresses", redact_addresses),
    ("case_numbers", redact_case_numbers),
    ("police_references", redact_police_references),
    ("device_ids", redact_device_ids),
    ("named_as", redact_named_as),
    ("numbered_roles", strip_role_numbers),
];

/// Rules applied to model output.
pub const POST_GENERATION_RULES: &[(&str, Rule)] = &[
    ("neutral_roles", neutralize_suspect_roles),
    ("emails", redact_emails),
    ("bsn", redact_bsn),
    ("phones", redact_phones),
    ("postcodes", redact_postcodes),
    ("addresses", redact_addresses),
    ("police_references", redact_police_references),
    ("case_numbers", redact_case_numbers),
    ("device_ids", redact_device_ids),
    ("birth_lines", redact_birth_line_starts),
    ("ages", remove_ages),
    ("whitespace", tidy_whitespace),
];

/// Run `rules` in order, logging which ones changed the text.
pub fn apply_rules(text: &str, rules: &[(&str, Rule)]) -> String {
    let mut out = text.to_string();
    for (name, rule) in rules {
        let next = rule(&out);
        if next != out {
            debug!(rule = *name, before = out.len(), after = next.len(), "redaction rule applied");
        }
        out = next;
    }
    out
}

/// Replace obvious PII in source text before it is sent to the model.
pub fn pre_anonymize(text: &str) -> String {
    apply_rules(text, PRE_GENERATION_RULES)
}

/// Redact PII from generated text.
///
/// Replacements are bracketed placeholders so sentences stay grammatical
/// for the repair and fragment-trim steps.
pub fn redact_summary(summary: &str) -> RedactionResult {
    let text = apply_rules(summary, POST_GENERATION_RULES);
    let changed = text != summary;
    RedactionResult { text, changed }
}

/// `Voornamen: Jan` -> `Voornamen: [naam verwijderd]`, and so on per label.
pub fn redact_label_lines(text: &str) -> String {
    LABEL_LINE
        .replace_all(text, |caps: &Captures| {
            let line = &caps[0];
            let Some((label, _)) = line.split_once(':') else {
                return "[gegevens verwijderd]".to_string();
            };
            let label = label.trim();
            let lower = label.to_lowercase();

            let placeholder = match lower.as_str() {
                "voornamen" | "achternaam" | "geslachtsnaam" => NAME_REMOVED,
                "geboorteplaats" | "nationaliteit" => "[gegevens verwijderd]",
                _ if lower.contains("nummer") || lower.contains("kenmerk") || lower.contains("skn") => {
                    IDENTIFIER_REMOVED
                }
                _ => "[gegevens verwijderd]",
            };
            format!("{}: {}", label, placeholder)
        })
        .into_owned()
}

pub fn redact_police_references(text: &str) -> String {
    POLICE_REFERENCE
        .replace_all(text, "[PV-kenmerk verwijderd]")
        .into_owned()
}

/// Whole lines mentioning a birth date or birthplace.
pub fn redact_birth_lines(text: &str) -> String {
    BIRTH_LINE.replace_all(text, BIRTH_DATE_REMOVED).into_owned()
}

/// Lines starting with a birth keyword (used on model output).
pub fn redact_birth_line_starts(text: &str) -> String {
    BIRTH_LINE_START
        .replace_all(text, BIRTH_DATE_REMOVED)
        .into_owned()
}

/// Dates on lines that also carry a birth keyword.
pub fn redact_birth_dates_in_context(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if BIRTH_CONTEXT.is_match(line) {
                let line = NUMERIC_DATE.replace_all(line, BIRTH_DATE_REMOVED);
                WRITTEN_DATE
                    .replace_all(&line, BIRTH_DATE_REMOVED)
                    .into_owned()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keep the salutation, drop the name.
pub fn redact_salutations(text: &str) -> String {
    SALUTATION
        .replace_all(text, format!("${{1}} {}", NAME_REMOVED).as_str())
        .into_owned()
}

pub fn redact_name_labels(text: &str) -> String {
    NAME_LABEL
        .replace_all(text, format!("${{1}}{}", NAME_REMOVED).as_str())
        .into_owned()
}

/// Initials followed by a surname, with or without a Dutch prefix.
pub fn redact_initials_names(text: &str) -> String {
    let text = INITIALS_PREFIX_SURNAME.replace_all(text, NAME_REMOVED);
    INITIALS_SURNAME
        .replace_all(&text, NAME_REMOVED)
        .into_owned()
}

pub fn redact_bsn(text: &str) -> String {
    BSN.replace_all(text, "[BSN verwijderd]").into_owned()
}

pub fn redact_emails(text: &str) -> String {
    EMAIL.replace_all(text, "[e-mail verwijderd]").into_owned()
}

/// Digit runs with at least nine digits.
pub fn redact_phones(text: &str) -> String {
    PHONE
        .replace_all(text, |caps: &Captures| {
            if digit_count(&caps[0]) >= 9 {
                "[telefoon verwijderd]".to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

pub fn redact_postcodes(text: &str) -> String {
    POSTCODE
        .replace_all(text, "[postcode verwijderd]")
        .into_owned()
}

pub fn redact_addresses(text: &str) -> String {
    let text = STREET_WITH_SUFFIX.replace_all(text, "[adres verwijderd]");
    ADDRESS_AFTER_PREPOSITION
        .replace_all(&text, "${1} [adres verwijderd]")
        .into_owned()
}

pub fn redact_case_numbers(text: &str) -> String {
    CASE_NUMBER
        .replace_all(text, "[zaaknummer verwijderd]")
        .into_owned()
}

/// IMEI numbers, serials and labelled case/system references.
pub fn redact_device_ids(text: &str) -> String {
    let identifier = |caps: &Captures| {
        if is_identifier(&caps[0]) {
            IDENTIFIER_REMOVED.to_string()
        } else {
            caps[0].to_string()
        }
    };
    let imei = format!("IMEI {}", IDENTIFIER_REMOVED);

    let text = IMEI.replace_all(text, imei.as_str());
    let text = IMEI_CONTEXT.replace_all(&text, imei.as_str());
    let text = DEVICE_ID.replace_all(&text, identifier);
    CASE_REFERENCE
        .replace_all(&text, identifier)
        .into_owned()
}

pub fn redact_named_as(text: &str) -> String {
    NAMED_AS
        .replace_all(text, format!("genaamd {}", NAME_REMOVED).as_str())
        .into_owned()
}

/// "betrokkene 11" -> "betrokkene".
pub fn strip_role_numbers(text: &str) -> String {
    NUMBERED_ROLE
        .replace_all(text, |caps: &Captures| caps[1].to_lowercase())
        .into_owned()
}

/// "verdachte"/"onderzochte" -> "betrokkene".
pub fn neutralize_suspect_roles(text: &str) -> String {
    SUSPECT.replace_all(text, "betrokkene").into_owned()
}

/// "23-jarige man" -> "een man"; bare ages are removed.
pub fn remove_ages(text: &str) -> String {
    let text = AGED_PERSON.replace_all(text, "een ${1}");
    let text = AGE_PHRASE.replace_all(&text, "");
    AGE_WORD.replace_all(&text, "").into_owned()
}

/// Collapse doubled spaces and blank-line runs, drop trailing spaces.
pub fn tidy_whitespace(text: &str) -> String {
    let text = DOUBLE_SPACES.replace_all(text, " ");
    let text = EXCESS_BLANK_LINES.replace_all(&text, "\n\n");
    TRAILING_SPACE
        .replace_all(&text, "\n")
        .trim()
        .to_string()
}
