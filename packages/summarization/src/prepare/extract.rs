//! Slicing charge sheets and record extracts down to their relevant part.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Suspicion/charge triggers, in preference order.
    static ref CHARGE_START: Vec<Regex> = [
        r"(?i)\bervan\s+verdacht\s+wordt\s*,?\s*dat\b",
        r"(?i)\btenlastelegging\b",
        r"(?i)\bten\s+laste\s+gelegd\b",
        r"(?i)\bwordt\s+verdacht\s+van\b",
        r"(?i)\bde\s+verdenking\s+is\s+dat\b",
        r"(?i)\bverdenking\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    /// Legal boilerplate and signature blocks that close the charges.
    static ref CHARGE_END: Vec<Regex> = [
        r"(?i)\boverwegende\b",
        r"(?i)\bartikelen\b",
        r"(?i)\bartikel\b",
        r"(?i)\bgelet\s+op\b",
        r"(?i)\baldus\b",
        r"(?i)\bondertekend\b",
        r"(?i)\bhandtekening\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    static ref RECORD_HEADINGS: Vec<Regex> = [
        r"(?i)\bopenstaande\s+zaken\s+betreffende\s+misdrijven\b",
        r"(?i)\bvolledig\s+afgedane\s+zaken\s+betreffende\s+misdrijven\b",
        r"(?i)\buittreksel\s+(van\s+)?justitiele\s+documentatie\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();
}

/// Slice a charge sheet from the first trigger to the first closer.
///
/// Triggers are tried in list order; the first that occurs anywhere wins.
/// A closer only counts when its first occurrence lies more than
/// `min_closer_offset` characters into the slice.
pub fn charge_sheet_relevant(text: &str, min_closer_offset: usize) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    let start = CHARGE_START
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.start())
        .unwrap_or(0);
    let mut segment = &text[start..];

    for re in CHARGE_END.iter() {
        if let Some(m) = re.find(segment) {
            if segment[..m.start()].chars().count() > min_closer_offset {
                segment = &segment[..m.start()];
                break;
            }
        }
    }

    segment.trim().to_string()
}

/// Slice a criminal-record extract from its first case heading to the end.
pub fn record_extract_relevant(text: &str) -> String {
    let text = text.trim();
    RECORD_HEADINGS
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| text[m.start()..].trim())
        .unwrap_or(text)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(n: usize) -> String {
        "Betrokkene werd aangehouden na een melding. ".repeat(n)
    }

    #[test]
    fn test_charge_sheet_sliced_between_trigger_and_closer() {
        let text = format!(
            "Parket Rotterdam\nVordering\nErvan verdacht wordt, dat hij {} Gelet op de wet.\nHandtekening",
            filler(10)
        );
        let out = charge_sheet_relevant(&text, 300);
        assert!(out.starts_with("Ervan verdacht wordt, dat hij"));
        assert!(!out.contains("Gelet op"));
        assert!(!out.contains("Parket"));
    }

    #[test]
    fn test_early_closer_is_ignored() {
        let text = format!("Tenlastelegging artikel 310 {}", filler(10));
        let out = charge_sheet_relevant(&text, 300);
        assert!(out.contains("artikel 310"));
        assert!(out.ends_with("melding."));
    }

    #[test]
    fn test_trigger_order_beats_position() {
        // "verdenking" occurs first but "tenlastelegging" is higher in the list
        let text = "De verdenking luidt. Tenlastelegging volgt.";
        assert_eq!(charge_sheet_relevant(text, 300), "Tenlastelegging volgt.");
    }

    #[test]
    fn test_no_trigger_keeps_full_text() {
        let text = "Geen relevante kop hier.";
        assert_eq!(charge_sheet_relevant(text, 300), text);
    }

    #[test]
    fn test_record_extract_from_first_heading() {
        let text = "Ministerie\nUittreksel van justitiele documentatie\nZaak 1";
        assert_eq!(
            record_extract_relevant(text),
            "Uittreksel van justitiele documentatie\nZaak 1"
        );
        assert_eq!(record_extract_relevant("Los verslag"), "Los verslag");
    }
}
