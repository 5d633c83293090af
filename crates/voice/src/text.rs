//! Text normalization for spoken input.
//!
//! The French Vosk model emits accented words, stray punctuation and filler
//! tokens; everything is folded down to a plain `[a-z0-9 ]` form before any
//! matching happens.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Filler words the recognizer frequently injects between the verb and the
/// app name (articles, prepositions, common noise words).
const FILLER_TOKENS: &[&str] = &[
    "a", "au", "aux", "de", "des", "du", "d", "l", "le", "la", "les", "un", "une", "et", "ou",
    "en", "dans", "sur", "pour", "avec", "ce", "ca", "cela", "c", "est", "s", "soeur", "soeurs",
];

/// Normalize free text: lowercase, strip accents, keep only ascii
/// alphanumerics, collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped: String = lowered.nfkd().filter(|c| !is_combining_mark(*c)).collect();

    let mut out = String::with_capacity(stripped.len());
    for ch in stripped.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
        } else if !out.ends_with(' ') && !out.is_empty() {
            out.push(' ');
        }
    }
    out.trim_end().to_string()
}

/// Drop filler tokens from normalized text.
pub fn strip_fillers(text: &str) -> String {
    normalize_text(text)
        .split_whitespace()
        .filter(|t| !FILLER_TOKENS.contains(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A lightweight phonetic-ish signature.
///
/// Helps when the French model outputs French-looking words for English app
/// names ("prusa slicer" heard as "prusse a cela et" still shares consonant
/// structure). Digraphs are folded, vowels dropped, repeats compressed.
pub fn skeleton(text: &str) -> String {
    let t = normalize_text(text).replace(' ', "");
    let t = t
        .replace("ph", "f")
        .replace("qu", "k")
        .replace("ck", "k")
        .replace('c', "k")
        .replace('q', "k")
        .replace('z', "s")
        .replace('v', "f");

    let mut out = String::new();
    for ch in t.chars() {
        if matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u' | 'y') {
            continue;
        }
        if out.chars().last() != Some(ch) {
            out.push(ch);
        }
    }
    out
}

/// Character-level similarity in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_trims() {
        assert_eq!(normalize_text("  Ouvre Firefox  "), "ouvre firefox");
    }

    #[test]
    fn test_normalize_strips_accents() {
        assert_eq!(normalize_text("démarre l'éditeur"), "demarre l editeur");
    }

    #[test]
    fn test_normalize_drops_punctuation() {
        assert_eq!(normalize_text("ouvre, firefox !"), "ouvre firefox");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_text("ouvre    le \t navigateur"), "ouvre le navigateur");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_text("Démarre   l'Éditeur!");
        assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn test_strip_fillers() {
        assert_eq!(strip_fillers("le la firefox de"), "firefox");
        assert_eq!(strip_fillers("ce est brave"), "brave");
    }

    #[test]
    fn test_skeleton_folds_digraphs_and_vowels() {
        assert_eq!(skeleton("prusa"), skeleton("prussa"));
        assert_eq!(skeleton("quick"), "k");
        assert_eq!(skeleton("phone"), "fn");
    }

    #[test]
    fn test_skeleton_survives_tokenization_differences() {
        assert_eq!(skeleton("fire fox"), skeleton("firefox"));
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("", "abc"), 0.0);
        assert_eq!(similarity("abc", "abc"), 1.0);
        let s = similarity("firefox", "fire fox");
        assert!(s > 0.8 && s < 1.0);
    }
}
