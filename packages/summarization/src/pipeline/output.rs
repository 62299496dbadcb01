//! Normalization of raw model output.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref INTRO: Regex =
        Regex::new(r"(?is)^\s*(hier(onder)?\s+)?(volgt|staat)\s+(de\s+)?samenvatting\s*:?\s*").unwrap();
    static ref BARE_INTRO: Regex = Regex::new(r"(?is)^\s*samenvatting\s*:?\s*").unwrap();

    /// Instruction echoes and delimiter tags the model repeats back.
    static ref ECHO_LINES: Vec<Regex> = [
        r"(?im)^\s*haal\s+diep\s+adem.*$",
        r"(?im)^\s*werk\s+stapsgewijs.*$",
        r"(?im)^\s*dit\s+is\s+een\s+samenvatting.*$",
        r"(?im)^\s*deze\s+samenvatting\s+is\s+gebaseerd\s+op.*$",
        r"(?im)^\s*\[TEKST\]\s*$",
        r"(?im)^\s*</TEKST>\s*$",
        r"(?im)^\s*DEELSAMENVATTINGEN?\s*:?\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    static ref SECTION_HEADER: Regex =
        Regex::new(r"(?i)^(?:(deel-)?samenvatting|eind(tekst|verslag))\s*:?$").unwrap();
    static ref BULLET_PREFIX: Regex = Regex::new(r"^(?:[-*•]|\d+[).])\s+").unwrap();
    static ref FINAL_HEADER: Regex = Regex::new(r"(?im)^\s*eind(tekst|verslag)\s*:?\s*").unwrap();
    static ref EXCESS_BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

const CHAT_MARKERS: &[&str] = &["<|assistant|>", "<|user|>", "<|system|>", "[INST]", "[/INST]"];

/// Strip intros, echoed instructions, tag lines and chat markers.
pub fn clean_output(raw: &str) -> String {
    let text = raw.trim();
    let text = INTRO.replace(text, "");
    let mut text = BARE_INTRO.replace(&text, "").into_owned();

    for re in ECHO_LINES.iter() {
        text = re.replace_all(&text, "").into_owned();
    }
    for marker in CHAT_MARKERS {
        text = text.replace(marker, "");
    }

    EXCESS_BLANK_LINES
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}

/// Turn MAP output into a `- ` bullet list, one fact per line.
///
/// Bare section headers ("Samenvatting:", "Eindtekst") are dropped and
/// `*`, `•`, `1)`, `1.` and `—` prefixes become `- `.
pub fn normalize_bullets(raw: &str) -> String {
    let text = clean_output(raw);

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !SECTION_HEADER.is_match(line))
        .map(|line| {
            let body = if let Some(m) = BULLET_PREFIX.find(line) {
                &line[m.end()..]
            } else if let Some(rest) = line.strip_prefix("— ") {
                rest.trim()
            } else {
                line
            };
            format!("- {}", body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Clean REDUCE output and drop a leading "Eindtekst:" header.
pub fn normalize_reduce_text(raw: &str) -> String {
    let text = clean_output(raw);
    if text.is_empty() {
        return text;
    }

    let text = FINAL_HEADER.replace_all(&text, "");
    EXCESS_BLANK_LINES
        .replace_all(text.trim(), "\n\n")
        .trim()
        .to_string()
}
