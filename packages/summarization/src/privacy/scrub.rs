//! Best-effort name scrubbing on generated text.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::detector::{NAMED_AS, NUMBERED_ROLE};
use super::redactor::{redact_initials_names, NAME_REMOVED};

lazy_static! {
    // "aangever Fortmann"
    static ref ROLE_NAME: Regex = Regex::new(
        r"\b((?i:aangever|aangeefster|getuige|betrokkene))\s+([A-Z][a-zà-ÿ]{2,}(?:[-\s][A-Z][a-zà-ÿ]{2,}){0,3})\b"
    ).unwrap();
    // "betrokkene, Jansen"
    static ref SUBJECT_NAME: Regex = Regex::new(
        r"\b(?i:betrokkene)[, ]+[A-Z][a-zà-ÿ]+(?:\s+[A-Z][a-zà-ÿ]+){0,3}\b"
    ).unwrap();
    static ref TITLE_NAME: Regex = Regex::new(
        r"\b((?i:officier\s+van\s+justitie|rechter-commissaris|raadsman|advocaat|verbalisant))\s+(?:(?i:mr)\.?\s+)?(?:[A-Z]\.){1,4}\s*(?:(?i:van|de|der|den|ten|ter|te)\s+)?[A-Z][a-zà-ÿ]+(?:[-\s][A-Z][a-zà-ÿ]+){0,2}\b"
    ).unwrap();
    static ref LABELLED_NAME: Regex = Regex::new(
        r"(?m)\b(?i:naam)\s*:\s*[A-Z][a-zà-ÿ]{2,}(?:\s+[A-Z][a-zà-ÿ]{2,}){1,3}\b"
    ).unwrap();

    static ref PERSON_THEN_SUBJECT: Regex =
        Regex::new(r"(?i)\been\s+(man|vrouw|persoon)\s*,?\s*betrokkene\b").unwrap();
    static ref ROLE_THEN_PERSON: Regex = Regex::new(
        r"(?i)\b(aangever|aangeefster|getuige|betrokkene)\s*,?\s*een\s+(man|vrouw|persoon)\b"
    ).unwrap();
    static ref INDEFINITE_PERSON: Regex = Regex::new(r"(?i)\been\s+(man|vrouw|persoon)\b").unwrap();
    static ref BY_INDEFINITE_PERSON: Regex =
        Regex::new(r"(?i)\bdoor\s+een\s+(man|vrouw|persoon)\b").unwrap();

    static ref DOUBLE_SPACES: Regex = Regex::new(r"[ \t]{2,}").unwrap();
    static ref EXCESS_BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

fn lowercase_role(caps: &Captures) -> String {
    caps[1].to_lowercase()
}

/// Remove name patterns that leak through generation.
///
/// Only capitalized words are treated as names, so role words followed by
/// ordinary verbs ("aangever verklaarde") are left alone.
pub fn scrub_names(text: &str) -> String {
    let text = redact_initials_names(text);
    let text = ROLE_NAME.replace_all(&text, lowercase_role);
    let text = SUBJECT_NAME.replace_all(&text, "betrokkene");
    let text = TITLE_NAME.replace_all(&text, format!("${{1}} {}", NAME_REMOVED).as_str());
    LABELLED_NAME
        .replace_all(&text, format!("naam: {}", NAME_REMOVED).as_str())
        .into_owned()
}

/// Police-report wording: anonymous roles, no "een man"/"een vrouw".
pub fn police_report_style(text: &str) -> String {
    let text = NAMED_AS.replace_all(text, format!("genaamd {}", NAME_REMOVED).as_str());
    let text = NUMBERED_ROLE.replace_all(&text, lowercase_role);

    let text = PERSON_THEN_SUBJECT.replace_all(&text, "betrokkene");
    let text = ROLE_THEN_PERSON.replace_all(&text, "$1");
    let text = INDEFINITE_PERSON.replace_all(&text, "een derde");
    let text = BY_INDEFINITE_PERSON.replace_all(&text, "door een derde");

    let text = DOUBLE_SPACES.replace_all(&text, " ");
    EXCESS_BLANK_LINES
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}
