//! Police report (PV) compaction: boilerplate lines, interview
//! transcripts and numeric tables.

use lazy_static::lazy_static;
use regex::Regex;

use super::collapse_blank_lines;
use crate::types::config::PreparerConfig;

lazy_static! {
    static ref BOILERPLATE_LINE: Regex = Regex::new(
        r"(?i)\binformatie\s+over\s+dit\s+document\b|\belektronisch\s+ondertekend\b|\beidas\b|\bhttps?://validatie\.nl\b|\bvalidatie\.nl\b|\bslachtofferrechten\b|\bmijnslachtofferzaak\.nl\b|\bmijnslachtofferzaak\b|\bslachtofferhulp\b|^form\.nr:|\bdocumentkenmerk\b|\bpolitieprocesdossier\.pdf\b|\bpagina\s+\d+\s+van\s+\d+\b|\bproces-verbaalnummer\b|\bdit\s+proces-verbaal\s+is\s+door\s+mij\s+opgemaakt\b|\bop\s+ambtseed\b|\bop\s+ambtsbelofte\b"
    ).unwrap();
    static ref BIN_NOISE: Regex = Regex::new(r"(?i)\bBIN\d{6,}\b").unwrap();

    static ref SUBSTANTIVE_HEADING: Regex =
        Regex::new(r"(?i)\bzaakinhoudelijk\s+verhoor\b").unwrap();
    static ref QA_PREFIX: Regex =
        Regex::new(r"(?i)^\s*(v\.?|a\.?|vraag|antw(?:oord)?)\s*[:\-]\s+\S").unwrap();
    static ref EMPTY_QA_MARKER: Regex = Regex::new(r"(?i)^(v|a|o|0)\s*:\s*$").unwrap();
    static ref FORM_HEADER: Regex = Regex::new(r"(?i)^form\.nr:|^proces-verbaalnummer").unwrap();

    static ref ACCOUNT_MARKER: Regex =
        Regex::new(r"(?i)\bIBAN\b|\brekening\b|\brekeningnummer\b").unwrap();
    static ref TABLE_DATE: Regex = Regex::new(r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b").unwrap();
}

/// Lines kept before the substantive heading when they mention one of these.
const KEEP_KEYWORDS: &[&str] = &[
    "zaakinhoudelijk",
    "mishandeling",
    "steek",
    "letsel",
    "camerabeelden",
    "video",
    "seh",
    "spoedeisende",
    "ziekenhuis",
    "huisarts",
    "bewustzijn",
    "wekadvies",
    "alcohol",
    "drugs",
    "coke",
    "coca",
    "promille",
    "schulden",
    "tikkie",
];

/// Personal and procedural questions, dropped everywhere.
const DROP_KEYWORDS: &[&str] = &[
    "wat is jouw naam",
    "geboortedatum",
    "woonadres",
    "telefoonnummer",
    "postcode",
    "advocaat",
    "consultatie",
    "verhoorbijstand",
    "folder",
    "rechten verdachte",
    "verificatie personalia",
    "identiteitskaart",
    "degene die de vraag stelde",
    "dit verhoor vind plaats",
];

/// Drop blank lines, e-signature notices, victim-rights links, form
/// numbers and BIN reference lines.
pub fn strip_boilerplate(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| {
            let s = line.trim();
            !s.is_empty() && !BOILERPLATE_LINE.is_match(s) && !BIN_NOISE.is_match(s)
        })
        .collect();
    collapse_blank_lines(&kept.join("\n")).trim().to_string()
}

/// Whether the report reads like a Q/A interview transcript.
pub fn is_interview_transcript(text: &str, config: &PreparerConfig) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    if SUBSTANTIVE_HEADING.is_match(text) {
        return true;
    }

    let sample: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(config.qa_sample_lines)
        .collect();
    if sample.is_empty() {
        return false;
    }

    let hits = sample.iter().filter(|l| QA_PREFIX.is_match(l)).count();
    if hits >= config.qa_min_hits {
        return true;
    }
    sample.len() >= config.qa_dense_min_lines
        && hits >= config.qa_dense_min_hits
        && hits as f64 / sample.len() as f64 >= config.qa_min_density
}

/// Keep only substantive interview content.
///
/// Before the "zaakinhoudelijk verhoor" heading only keyword-relevant
/// lines survive; after it nearly everything does. Personal/procedural
/// question lines are dropped on both sides.
pub fn compact_interview(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut substantive = false;

    for line in text.lines() {
        let s = line.trim();
        if s.is_empty() {
            continue;
        }
        if SUBSTANTIVE_HEADING.is_match(s) {
            substantive = true;
            out.push(s);
            continue;
        }
        if EMPTY_QA_MARKER.is_match(s) {
            continue;
        }

        let lower = s.to_lowercase();
        if DROP_KEYWORDS.iter().any(|k| lower.contains(k)) {
            continue;
        }
        if !substantive {
            if KEEP_KEYWORDS.iter().any(|k| lower.contains(k)) {
                out.push(s);
            }
            continue;
        }
        if FORM_HEADER.is_match(s) {
            continue;
        }
        out.push(s);
    }

    collapse_blank_lines(&out.join("\n")).trim().to_string()
}

fn is_numeric_heavy(line: &str, config: &PreparerConfig) -> bool {
    let s = line.trim();
    if s.is_empty() || s.starts_with("=== PAGINA") {
        return false;
    }

    let digits = s.chars().filter(|c| c.is_numeric()).count();
    let letters = s.chars().filter(|c| c.is_alphabetic()).count();

    if digits >= config.numeric_min_digits && digits as f64 > letters as f64 * config.numeric_digit_ratio
    {
        return true;
    }
    if ACCOUNT_MARKER.is_match(s) && digits >= config.account_min_digits {
        return true;
    }
    TABLE_DATE.is_match(s)
        && digits >= config.dated_row_min_digits
        && letters <= config.dated_row_max_letters
}

/// Fold long runs of table-like lines into head, marker and tail.
pub fn compact_numeric_runs(text: &str, config: &PreparerConfig) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        if !is_numeric_heavy(lines[i], config) {
            out.push(lines[i].trim_end().to_string());
            i += 1;
            continue;
        }

        let mut j = i;
        while j < lines.len() && is_numeric_heavy(lines[j], config) {
            j += 1;
        }
        let block: Vec<&str> = lines[i..j].iter().map(|l| l.trim_end()).collect();
        let omitted = block
            .len()
            .saturating_sub(config.keep_head + config.keep_tail);

        if block.len() >= config.min_block_lines && omitted > 0 {
            out.extend(block[..config.keep_head].iter().map(|l| l.to_string()));
            out.push(format!(
                "[...] {} regels met transactie-/cijfergegevens weggelaten [...]",
                omitted
            ));
            out.extend(block[block.len() - config.keep_tail..].iter().map(|l| l.to_string()));
        } else {
            out.extend(block.iter().map(|l| l.to_string()));
        }
        i = j;
    }

    collapse_blank_lines(&out.join("\n")).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interview_fixture() -> String {
        let mut lines = vec![
            "Proces-verbaal van verhoor verdachte".to_string(),
            "V: Wat is jouw naam?".to_string(),
            "A: Dat weet u al.".to_string(),
            "V: Wat is je geboortedatum?".to_string(),
            "A: Dat staat in het systeem.".to_string(),
            "V: Wat is je woonadres?".to_string(),
            "A: Ik woon bij mijn moeder.".to_string(),
        ];
        for i in 0..6 {
            lines.push(format!("V: Vraag over de avond nummer {}?", i));
            lines.push(format!("A: Ik was die avond gewoon buiten, antwoord {}.", i));
        }
        lines.push("V: Heb je de camerabeelden gezien?".to_string());
        lines.push("A: Op de camerabeelden ben ik niet te zien.".to_string());

        let mut text = lines.join("\n");
        while text.len() < 5000 {
            text.push_str("\nDe verbalisant noteerde de omstandigheden van het verhoor uitgebreid.");
        }
        text
    }

    #[test]
    fn test_strip_boilerplate_drops_notices() {
        let text = "Dit document is elektronisch ondertekend\n\nAangifte van mishandeling\nForm.nr: 123\nBIN1234567\nZie mijnslachtofferzaak.nl\nVerdachte sloeg aangever.";
        assert_eq!(
            strip_boilerplate(text),
            "Aangifte van mishandeling\nVerdachte sloeg aangever."
        );
    }

    #[test]
    fn test_interview_detection_by_heading_and_hits() {
        let config = PreparerConfig::default();
        assert!(is_interview_transcript("Zaakinhoudelijk verhoor\nBla", &config));
        assert!(is_interview_transcript(&interview_fixture(), &config));
        assert!(!is_interview_transcript(
            "Proces-verbaal van bevindingen\nIk zag een auto.\nV: eén vraag",
            &config
        ));
        assert!(!is_interview_transcript("   ", &config));
    }

    #[test]
    fn test_interview_detection_by_density() {
        let config = PreparerConfig::default();
        let mut lines: Vec<String> = (0..200).map(|i| format!("Verklaring regel {}", i)).collect();
        for i in 0..6 {
            lines[i * 30] = format!("V: vraag {}", i);
        }
        assert!(is_interview_transcript(&lines.join("\n"), &config));

        lines.truncate(150);
        assert!(!is_interview_transcript(&lines.join("\n"), &config));
    }

    #[test]
    fn test_compaction_keeps_camera_lines_and_drops_personal_questions() {
        let text = interview_fixture();
        let config = PreparerConfig::default();
        assert!(is_interview_transcript(&text, &config));

        let out = compact_interview(&text);
        assert_eq!(out.matches("camerabeelden").count(), 2);
        assert!(!out.contains("geboortedatum"));
        assert!(!out.contains("woonadres"));
        assert!(!out.contains("Vraag over de avond"));
    }

    #[test]
    fn test_compaction_keeps_substantive_part() {
        let text = "V: Wat is je geboortedatum?\nV:\nZaakinhoudelijk verhoor\nV: Wat gebeurde er?\nA: Ik liep naar huis.\nForm.nr: 77\nA: Mijn advocaat weet het.";
        assert_eq!(
            compact_interview(text),
            "Zaakinhoudelijk verhoor\nV: Wat gebeurde er?\nA: Ik liep naar huis."
        );
    }

    #[test]
    fn test_numeric_run_is_folded() {
        let config = PreparerConfig::default();
        let mut lines = vec!["Overzicht transacties".to_string()];
        for i in 0..15 {
            lines.push(format!("01-02-2023 NL00BANK0{:09} 12,{:02}", i, i));
        }
        lines.push("Einde overzicht".to_string());

        let out = compact_numeric_runs(&lines.join("\n"), &config);
        let out_lines: Vec<&str> = out.lines().collect();
        assert_eq!(out_lines.len(), 1 + 6 + 1 + 4 + 1);
        assert_eq!(out_lines[7], "[...] 5 regels met transactie-/cijfergegevens weggelaten [...]");
        assert_eq!(out_lines[6], lines[6]);
        assert_eq!(out_lines[8], lines[12]);
        assert_eq!(out_lines.last(), Some(&"Einde overzicht"));
    }

    #[test]
    fn test_short_numeric_runs_are_kept() {
        let config = PreparerConfig::default();
        let rows: Vec<String> = (0..10)
            .map(|i| format!("IBAN NL00BANK0{:09}", i))
            .collect();
        let text = rows.join("\n");
        assert_eq!(compact_numeric_runs(&text, &config), text);
    }

    #[test]
    fn test_page_markers_are_never_numeric() {
        let config = PreparerConfig::default();
        assert!(!is_numeric_heavy("=== PAGINA 12345678901234 ===", &config));
        assert!(is_numeric_heavy("12345678901234 5678", &config));
        assert!(!is_numeric_heavy("Betrokkene had 1 euro bij zich", &config));
    }
}
