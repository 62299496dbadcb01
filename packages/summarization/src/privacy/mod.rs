/// PII detection and redaction for Dutch case documents
///
/// Source text is pre-anonymized before any of it reaches the model, and
/// generated text is redacted again afterwards. Both passes are regex-based
/// and replace matches with bracketed Dutch placeholders such as
/// `[naam verwijderd]`, so the result still reads as prose.
///
/// # Families
///
/// - **Structured**: e-mail, phone numbers, BSN, postcodes, parket numbers,
///   PL references, IMEI and labelled device/case identifiers
/// - **Addresses**: street names with a known suffix, or capitalized names
///   after a location preposition followed by a house number
/// - **Names**: initials plus surname, salutations, `naam:` labels,
///   `genaamd X`, role plus proper name
/// - **Birth and age**: birth lines, dates in birth context, `NN-jarige`
///
/// # Examples
///
/// ```rust
/// use summarization::privacy::{detect_pii, redact_summary};
///
/// let text = "Betrokkene mailde naar jan@voorbeeld.nl.";
/// assert!(!detect_pii(text).is_empty());
///
/// let clean = redact_summary(text);
/// assert!(clean.changed);
/// assert!(detect_pii(&clean.text).is_empty());
/// ```

pub mod detector;
pub mod redactor;
pub mod scrub;

pub use detector::{detect_pii, PiiFindings, PiiKind, PiiMatch};
pub use redactor::{pre_anonymize, redact_summary, RedactionResult};
pub use scrub::{police_report_style, scrub_names};
