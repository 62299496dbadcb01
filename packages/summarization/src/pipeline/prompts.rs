//! Prompts for the MAP, REDUCE and repair passes.
//!
//! Prompts use the Mistral instruction format and are fitted to the model
//! context with a rough character-based token estimate.

use tracing::debug;

use crate::classify::normalize::truncate_chars;
use crate::types::config::FitConfig;

/// System message shared by MAP and REDUCE.
pub const SYSTEM_PROMPT: &str = "Je bent een zorgvuldig forensisch samenvatter. \
Volg de regels strikt. Verzin niets. \
Als iets niet expliciet in de tekst staat, laat het weg.";

/// Trailing directive for MAP prompts.
pub const MAP_DIRECTIVE: &str = "OUTPUT: uitsluitend bullets. Geen inleiding, geen kopjes, geen meta-tekst. \
Geen doublures. Neem alleen feiten op die expliciet in de bronpassage staan.";

/// Trailing directive for REDUCE prompts.
pub const REDUCE_DIRECTIVE: &str = "OUTPUT: eindtekst zonder herhaling. Geen meta-tekst. \
Geen verwijzingen naar 'bullets' of 'deelsamenvattingen'. \
Geen duplicaten van zinnen/regels. Geen lege kopjes.";

pub const FAST_MAP_DIRECTIVE: &str = "Beperk je antwoord tot maximaal 10 bullets voor deze passage.";
pub const FAST_REDUCE_DIRECTIVE: &str = "Houd de eindtekst beknopt (ongeveer 8–12 zinnen).";

/// Header used when a category has no reduce template of its own.
pub const DEFAULT_REDUCE_HEADER: &str =
    "Combineer de onderstaande bullets tot één professionele tekst.";

pub const REPAIR_SYSTEM_PROMPT: &str = "Je bent een uiterst nauwkeurige forensisch-juridische redacteur. \
Je herschrijft tekst zonder nieuwe feiten toe te voegen.";

/// Rewrite instruction for the repair pass. `{summary}` is replaced.
pub const REPAIR_PROMPT: &str = r#"Herschrijf de onderstaande tekst tot een anonieme, formele tekst (Nederlands) voor een forensisch-psychiatrisch/juridisch verslag.

HARD REGELS
- Voeg GEEN nieuwe feiten toe. Laat GEEN inhoudelijke feiten weg.
- Verwijder uitsluitend persoonsgegevens (namen/initialen, geboortedatum/plaats, leeftijd, adressen, postcodes, telefoons, e-mail, BSN/ID, parket/zaaknummers).
- Gebruik consequente rollen: betrokkene / aangever(aangeefster) / getuige.
- Corrigeer grammatica en maak volledige zinnen (onderwerp + werkwoord). Behoud alle feiten.
- Geen meta-tekst (geen 'dit is een samenvatting', geen verwijzingen naar prompts/tags/bullets).
- Geen markdown-kopjes (geen ###, geen vetgedrukte titels), geen blokken met drie aanhalingstekens.
- Houd de tekst in de verleden tijd.

TEKST:
<<BEGIN_TEKST>>
{summary}
<<EINDE_TEKST>>"#;

/// MAP and REDUCE directives, extended for fast mode.
pub fn directives(fast_mode: bool) -> (String, String) {
    if fast_mode {
        (
            format!("{} {}", MAP_DIRECTIVE, FAST_MAP_DIRECTIVE),
            format!("{} {}", REDUCE_DIRECTIVE, FAST_REDUCE_DIRECTIVE),
        )
    } else {
        (MAP_DIRECTIVE.to_string(), REDUCE_DIRECTIVE.to_string())
    }
}

/// Wrap a system and user message in `<s>[INST] ... [/INST]`.
pub fn format_instruction(system: &str, user: &str) -> String {
    let system = system.trim();
    let user = user.trim();
    if system.is_empty() {
        format!("<s>[INST] {} [/INST]", user)
    } else {
        format!("<s>[INST] {}\n\n{} [/INST]", system, user)
    }
}

/// Template, then the body between `[TEKST]` markers, then an optional directive.
pub fn format_user_message(template: &str, body: &str, extra: &str) -> String {
    let mut message = format!("{}\n\n[TEKST]\n{}\n</TEKST>\n", template.trim(), body.trim());
    if !extra.is_empty() {
        message.push('\n');
        message.push_str(extra.trim());
    }
    message
}

/// Numbered partial summaries under a reduce header.
pub fn format_reduce_message(header: &str, parts: &[String], extra: &str) -> String {
    let numbered = parts
        .iter()
        .enumerate()
        .map(|(i, part)| format!("{})\n{}", i + 1, part))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut message = format!("{}\n\nDEELSAMENVATTINGEN:\n{}", header, numbered);
    if !extra.is_empty() {
        message.push_str("\n\n");
        message.push_str(extra.trim());
    }
    message.trim().to_string()
}

pub fn format_repair_prompt(summary: &str) -> String {
    let user = REPAIR_PROMPT.replace("{summary}", summary.trim());
    format_instruction(REPAIR_SYSTEM_PROMPT, &user)
}

/// Rough token count: characters divided by `chars_per_token`, at least 1.
pub fn estimate_tokens(text: &str, fit: &FitConfig) -> usize {
    let estimate = (text.chars().count() as f64 / fit.chars_per_token) as usize;
    estimate.max(1)
}

/// Build a MAP prompt, shrinking the body until it fits the context.
///
/// Shrinking stops once the body is shorter than `body_min_chars`, in which
/// case the prompt is returned even if it is still over the limit.
pub fn fit_prompt(
    system: &str,
    template: &str,
    body: &str,
    extra: &str,
    target_ctx: usize,
    fit: &FitConfig,
) -> String {
    let limit = fit
        .prompt_floor_tokens
        .max((target_ctx as f64 * fit.ctx_fill_ratio) as usize);
    let mut body = body.trim();

    loop {
        let prompt = format_instruction(system, &format_user_message(template, body, extra));
        let tokens = estimate_tokens(&prompt, fit);
        let body_chars = body.chars().count();
        if tokens <= limit || body_chars < fit.body_min_chars {
            return prompt;
        }

        let keep = (body_chars as f64 * fit.body_shrink_ratio) as usize;
        if keep >= body_chars {
            return prompt;
        }
        debug!(tokens, limit, body_chars, keep, "shrinking prompt body");
        body = truncate_chars(body, keep).trim();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_instruction() {
        assert_eq!(
            format_instruction(" sys ", " vraag "),
            "<s>[INST] sys\n\nvraag [/INST]"
        );
        assert_eq!(format_instruction("", "vraag"), "<s>[INST] vraag [/INST]");
    }

    #[test]
    fn test_format_user_message() {
        assert_eq!(
            format_user_message("Vat samen.", " tekst ", ""),
            "Vat samen.\n\n[TEKST]\ntekst\n</TEKST>\n"
        );
        assert_eq!(
            format_user_message("Vat samen.", "tekst", " extra "),
            "Vat samen.\n\n[TEKST]\ntekst\n</TEKST>\n\nextra"
        );
    }

    #[test]
    fn test_format_reduce_message_numbers_parts() {
        let parts = vec!["- a".to_string(), "- b".to_string()];
        assert_eq!(
            format_reduce_message("Kop", &parts, "Slot"),
            "Kop\n\nDEELSAMENVATTINGEN:\n1)\n- a\n\n2)\n- b\n\nSlot"
        );
    }

    #[test]
    fn test_repair_prompt_embeds_summary() {
        let prompt = format_repair_prompt("  Betrokkene J. Jansen sloeg.  ");
        assert!(prompt.starts_with("<s>[INST] Je bent een uiterst nauwkeurige"));
        assert!(prompt.contains("<<BEGIN_TEKST>>\nBetrokkene J. Jansen sloeg.\n<<EINDE_TEKST>> [/INST]"));
        assert!(prompt.contains("HARD REGELS"));
    }

    #[test]
    fn test_estimate_tokens() {
        let fit = FitConfig::default();
        assert_eq!(estimate_tokens("", &fit), 1);
        assert_eq!(estimate_tokens(&"x".repeat(40), &fit), 11);
    }

    #[test]
    fn test_fit_prompt_keeps_small_prompt() {
        let fit = FitConfig::default();
        let prompt = fit_prompt(SYSTEM_PROMPT, "Vat samen.", "Korte tekst.", MAP_DIRECTIVE, 2048, &fit);
        assert!(prompt.contains("[TEKST]\nKorte tekst.\n</TEKST>"));
    }

    #[test]
    fn test_fit_prompt_shrinks_long_body() {
        let fit = FitConfig::default();
        let body = "woord ".repeat(2000);
        let prompt = fit_prompt(SYSTEM_PROMPT, "Vat samen.", &body, MAP_DIRECTIVE, 2048, &fit);

        let limit = (2048.0 * fit.ctx_fill_ratio) as usize;
        assert!(estimate_tokens(&prompt, &fit) <= limit);
        assert!(prompt.len() < body.len());
        assert!(prompt.ends_with(&format!("{} [/INST]", MAP_DIRECTIVE)));
    }

    #[test]
    fn test_fit_prompt_stops_at_minimum_body() {
        let fit = FitConfig {
            prompt_floor_tokens: 1,
            ..FitConfig::default()
        };
        let body = "x".repeat(5000);
        // A context this small can never fit; shrinking stops near the floor
        let prompt = fit_prompt("", "", &body, "", 10, &fit);
        let kept = prompt.chars().filter(|c| *c == 'x').count();
        assert!(kept < fit.body_min_chars);
        assert!(kept >= (fit.body_min_chars as f64 * fit.body_shrink_ratio) as usize);
    }

    #[test]
    fn test_directives_fast_mode() {
        let (map, reduce) = directives(true);
        assert!(map.ends_with(FAST_MAP_DIRECTIVE));
        assert!(reduce.ends_with(FAST_REDUCE_DIRECTIVE));
        assert_eq!(directives(false).0, MAP_DIRECTIVE);
    }
}
