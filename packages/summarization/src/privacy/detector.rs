use lazy_static::lazy_static;
use regex::Regex;

/// Family of personal data or identifier recognized in Dutch case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PiiKind {
    Email,
    Phone,
    Bsn,
    Postcode,
    Address,
    CaseNumber,
    PoliceReference,
    DeviceId,
    BirthDate,
    Age,
    InitialsName,
    NamedAs,
    NumberedRole,
}

/// A detected piece of PII with its location.
#[derive(Debug, Clone)]
pub struct PiiMatch {
    pub kind: PiiKind,
    pub start: usize,
    pub end: usize,
}

/// Collection of detected PII.
#[derive(Debug, Default, Clone)]
pub struct PiiFindings {
    pub matches: Vec<PiiMatch>,
}

impl PiiFindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: PiiKind, start: usize, end: usize) {
        self.matches.push(PiiMatch { kind, start, end });
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn count(&self) -> usize {
        self.matches.len()
    }

    pub fn by_kind(&self, kind: PiiKind) -> Vec<&PiiMatch> {
        self.matches.iter().filter(|m| m.kind == kind).collect()
    }
}

lazy_static! {
    pub(crate) static ref EMAIL: Regex =
        Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").unwrap();
    pub(crate) static ref PHONE: Regex = Regex::new(r"\b(?:\+?\d[\d\s().-]{7,}\d)\b").unwrap();
    pub(crate) static ref POSTCODE: Regex = Regex::new(r"(?i)\b\d{4}\s?[A-Z]{2}\b").unwrap();
    pub(crate) static ref BSN: Regex = Regex::new(r"\b\d{9}\b").unwrap();
    pub(crate) static ref CASE_NUMBER: Regex = Regex::new(r"\b\d{2}[./-]\d{6}[/-]\d{2}\b").unwrap();
    pub(crate) static ref POLICE_REFERENCE: Regex = Regex::new(r"(?i)\bPL\d{4}-\d{6,}\b").unwrap();

    // Name parts below are case-sensitive: a capital is what tells
    // "op Smidswater 11" apart from "in totaal 12".

    // "Multi Word straat 12"
    pub(crate) static ref STREET_WITH_SUFFIX: Regex = Regex::new(
        r"\b[A-ZÀ-Ý][\wÀ-ÿ .'-]{1,50}\s(?i:straat|laan|weg|plein|dijk|kade|singel|hof|steeg|gracht|allee|pad|boulevard|park|wal|plaats|baan|brug)\s+\d+[a-zA-Z]?\b"
    ).unwrap();

    // "op Smidswater 11": only after a location preposition
    pub(crate) static ref ADDRESS_AFTER_PREPOSITION: Regex = Regex::new(
        r"\b((?i:op|in|te|aan|bij|naar))\s+([A-ZÀ-Ý][A-Za-zÀ-ÿ'’-]{2,}(?:[-\s][A-ZÀ-Ý][A-Za-zÀ-ÿ'’-]{2,}){0,2}\s+\d{1,4}[a-zA-Z]?)\b"
    ).unwrap();

    pub(crate) static ref AGE_PHRASE: Regex = Regex::new(r"(?i)\b\d{1,3}\s*-\s*jarige\b").unwrap();
    pub(crate) static ref AGE_WORD: Regex = Regex::new(r"(?i)\b\d{1,3}\s*jarige\b").unwrap();
    pub(crate) static ref BIRTH_CONTEXT: Regex =
        Regex::new(r"(?i)\b(geboortedatum|geb\.?|geboren(?:\s+op)?|geboren te)\b").unwrap();

    pub(crate) static ref INITIALS_SURNAME: Regex = Regex::new(
        r"\b(?:[A-Z]\.){1,4}\s*[A-Z][a-zà-ÿ]+(?:[-\s][A-Z][a-zà-ÿ]+){0,2}\b"
    ).unwrap();
    pub(crate) static ref INITIALS_PREFIX_SURNAME: Regex = Regex::new(
        r"\b(?:[A-Z]\.){1,4}\s*(?i:van|de|der|den|ten|ter|te)\s+[A-Z][a-zà-ÿ]+(?:[-\s][A-Z][a-zà-ÿ]+){0,2}\b"
    ).unwrap();
    pub(crate) static ref NAMED_AS: Regex = Regex::new(
        r"\b(?i:genaamd)\s+[A-Z][a-zà-ÿ]{1,}(?:\s+[A-Z][a-zà-ÿ]{1,}){0,3}\b"
    ).unwrap();
    pub(crate) static ref NUMBERED_ROLE: Regex =
        Regex::new(r"(?i)\b(betrokkene|aangever|aangeefster|getuige)\s+\d+\b").unwrap();

    pub(crate) static ref IMEI: Regex =
        Regex::new(r"(?i)\bIMEI\b\s*(?:[:=#]?\s*)?(\d{14,17})\b").unwrap();
    pub(crate) static ref IMEI_CONTEXT: Regex =
        Regex::new(r"(?i)\bIMEI\b[^\n\r0-9]{0,20}(\d{14,17})").unwrap();
    // Identifier values must also contain a digit, see `is_identifier`.
    pub(crate) static ref CASE_REFERENCE: Regex = Regex::new(
        r"\b(?i:BVH|SKN|ZK|ZKN|PV|zaak|parket)\s*(?i:nr\.?|nummer)?\s*[:=#]?\s*(?i:[A-Z0-9][A-Z0-9-]{4,})\b"
    ).unwrap();
    pub(crate) static ref DEVICE_ID: Regex = Regex::new(
        r"\b(?i:serial|serienummer|documentnummer|id-?nummer|registratienummer)\b\s*[:=#]?\s*(?i:[A-Z0-9][A-Z0-9-]{4,})\b"
    ).unwrap();
}

/// Detect every PII family still present in `text`.
pub fn detect_pii(text: &str) -> PiiFindings {
    let mut findings = PiiFindings::new();

    let checks: [(PiiKind, &Regex); 16] = [
        (PiiKind::Email, &*EMAIL),
        (PiiKind::Bsn, &*BSN),
        (PiiKind::Postcode, &*POSTCODE),
        (PiiKind::Address, &*STREET_WITH_SUFFIX),
        (PiiKind::Address, &*ADDRESS_AFTER_PREPOSITION),
        (PiiKind::CaseNumber, &*CASE_NUMBER),
        (PiiKind::PoliceReference, &*POLICE_REFERENCE),
        (PiiKind::DeviceId, &*IMEI),
        (PiiKind::DeviceId, &*IMEI_CONTEXT),
        (PiiKind::BirthDate, &*BIRTH_CONTEXT),
        (PiiKind::Age, &*AGE_PHRASE),
        (PiiKind::Age, &*AGE_WORD),
        (PiiKind::InitialsName, &*INITIALS_PREFIX_SURNAME),
        (PiiKind::InitialsName, &*INITIALS_SURNAME),
        (PiiKind::NamedAs, &*NAMED_AS),
        (PiiKind::NumberedRole, &*NUMBERED_ROLE),
    ];

    for (kind, re) in checks {
        for mat in re.find_iter(text) {
            findings.add(kind, mat.start(), mat.end());
        }
    }

    for (kind, re) in [(PiiKind::DeviceId, &*DEVICE_ID), (PiiKind::CaseNumber, &*CASE_REFERENCE)] {
        for mat in re.find_iter(text).filter(|m| is_identifier(m.as_str())) {
            findings.add(kind, mat.start(), mat.end());
        }
    }

    // Only long digit runs count as phone numbers
    for mat in PHONE.find_iter(text) {
        if digit_count(mat.as_str()) >= 9 {
            findings.add(PiiKind::Phone, mat.start(), mat.end());
        }
    }

    findings
}

pub(crate) fn digit_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Labelled identifier matches only count when the value holds a digit.
pub(crate) fn is_identifier(matched: &str) -> bool {
    digit_count(matched) > 0
}
