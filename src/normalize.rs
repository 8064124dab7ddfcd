//! Search-name cleanup.
//!
//! Storefront names carry trademark glyphs, punctuation and accented
//! letters that tank search-result hit rates. This module strips the
//! glyphs and transliterates non-ASCII letters to their bare ASCII form
//! by way of their Unicode character names, which beats maintaining a
//! hardcoded translation table.

use once_cell::sync::Lazy;
use regex::Regex;

static LATIN_LETTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"LATIN (SMALL|CAPITAL) LETTER ([A-Za-z0-9]+)").unwrap());

/// Clean up a game name so it's more likely to show up in search results.
///
/// Removes `®`/`™`, collapses `": "` and `" - "` to a space, drops
/// apostrophes, then substitutes any non-ASCII character whose Unicode
/// name reads `LATIN {SMALL|CAPITAL} LETTER {X}` with the bare `X`
/// (lower-cased for SMALL). Untranslatable characters are kept as-is
/// with a debug diagnostic; this function never fails.
pub fn clean_game_name(name: &str) -> String {
    let cleaned = name
        .replace('\u{ae}', "")
        .replace('\u{2122}', "")
        .replace(": ", " ")
        .replace('\'', "")
        .replace(" - ", " ");

    let mut out = String::with_capacity(cleaned.len());

    for c in cleaned.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }

        let char_name = match unicode_names2::name(c) {
            Some(n) => n.to_string(),
            None => {
                tracing::debug!("Non-ascii char {} has no unicode name", c);
                out.push(c);
                continue;
            }
        };

        if let Some(caps) = LATIN_LETTER_RE.captures(&char_name) {
            let letters = &caps[2];
            if &caps[1] == "SMALL" {
                out.push_str(&letters.to_lowercase());
            } else {
                out.push_str(letters);
            }
        } else {
            tracing::debug!(
                "Non-ascii char {} ({}) couldn't be transliterated",
                c,
                char_name
            );
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_trademark_glyphs() {
        assert_eq!(clean_game_name("DARK SOULS\u{2122}"), "DARK SOULS");
        assert_eq!(clean_game_name("Tetris\u{ae}"), "Tetris");
    }

    #[test]
    fn test_punctuation_replacements() {
        assert_eq!(clean_game_name("Half-Life: Alyx"), "Half-Life Alyx");
        assert_eq!(clean_game_name("Assassin's Creed"), "Assassins Creed");
        assert_eq!(clean_game_name("Fallout - New Vegas"), "Fallout New Vegas");
    }

    #[test]
    fn test_trademark_then_colon() {
        // Removing the glyph first exposes the ": " sequence
        assert_eq!(
            clean_game_name("DARK SOULS\u{2122}: REMASTERED"),
            "DARK SOULS REMASTERED"
        );
    }

    #[test]
    fn test_accented_latin_letters_become_ascii() {
        assert_eq!(clean_game_name("Pok\u{e9}mon"), "Pokemon");
        assert!(clean_game_name("Cr\u{e8}me de la Cr\u{e8}me").is_ascii());
    }

    #[test]
    fn test_multi_letter_names() {
        // LATIN CAPITAL LETTER AE / LATIN SMALL LETTER AE
        assert_eq!(clean_game_name("\u{c6}on Flux"), "AEon Flux");
        assert_eq!(clean_game_name("\u{e6}on"), "aeon");
    }

    #[test]
    fn test_untranslatable_chars_are_kept() {
        // WHITE STAR has no LATIN LETTER name
        assert_eq!(clean_game_name("Star\u{2606}Game"), "Star\u{2606}Game");
    }
}
