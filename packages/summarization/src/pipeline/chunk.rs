//! Greedy chunking of prepared text.

/// A newline is preferred as cut point only past this fraction of the window.
const NEWLINE_CUT_FRACTION: f64 = 0.6;

/// Split `text` into trimmed pieces of at most `max_chars` characters.
///
/// Scans forward one window at a time; when the window contains a newline
/// beyond 60% of its length, the cut happens at the last such newline
/// instead of at the hard boundary. Returns no chunks only for empty or
/// whitespace-only input.
pub fn chunk(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let max_chars = max_chars.max(1);
    let min_cut = (max_chars as f64 * NEWLINE_CUT_FRACTION) as usize;

    // Byte offset of every char boundary, including the end of the text
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let total = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < total {
        let mut end = (start + max_chars).min(total);

        let window = &text[bounds[start]..bounds[end]];
        if let Some(newline) = window.rfind('\n') {
            let offset = window[..newline].chars().count();
            if offset > min_cut {
                end = start + offset;
            }
        }

        let piece = text[bounds[start]..bounds[end]].trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }
        start = end;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strip_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_empty_input_has_no_chunks() {
        assert!(chunk("", 100).is_empty());
        assert!(chunk(" \n\t ", 100).is_empty());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(chunk("  Korte tekst.  ", 100), vec!["Korte tekst."]);
    }

    #[test]
    fn test_cuts_at_late_newline() {
        let text = format!("{}\n{}", "a".repeat(8), "b".repeat(8));
        assert_eq!(chunk(&text, 10), vec!["a".repeat(8), "b".repeat(8)]);
    }

    #[test]
    fn test_early_newline_is_ignored() {
        let text = format!("aa\n{}", "b".repeat(20));
        let chunks = chunk(&text, 10);
        assert_eq!(chunks[0], format!("aa\n{}", "b".repeat(7)));
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "é".repeat(25);
        let chunks = chunk(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 10);
    }

    proptest! {
        #[test]
        fn chunks_respect_size_and_preserve_content(
            text in "[a-z .\n]{0,400}",
            max_chars in 1usize..80,
        ) {
            let chunks = chunk(&text, max_chars);

            prop_assert_eq!(chunks.is_empty(), text.trim().is_empty());
            for c in &chunks {
                prop_assert!(c.chars().count() <= max_chars);
                prop_assert!(!c.is_empty());
            }
            prop_assert_eq!(strip_whitespace(&chunks.concat()), strip_whitespace(&text));
        }
    }
}
