// Text canonicalization used before profanity matching.
//
// Persian text arrives with Arabic letterforms, harakat and ZWNJ mixed in;
// Latin text may carry accents. Everything collapses to one form so that a
// word list entry matches however the sender typed it.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Arabic letterforms that collapse onto their Persian equivalents.
const SCRIPT_VARIANTS: &[(char, char)] = &[
    ('ي', 'ی'),
    ('ك', 'ک'),
    ('ۀ', 'ه'),
    ('ە', 'ه'),
    ('ة', 'ه'),
    ('ؤ', 'و'),
    ('أ', 'ا'),
    ('إ', 'ا'),
];

/// Canonicalize `text` for matching. Total and deterministic.
pub fn normalize(text: &str) -> String {
    // Mapped on both sides of NFD: precomposed forms like `ۀ` map directly,
    // while `ئ` only exposes its Arabic yeh once the hamza is split off.
    let mapped: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(map_script_variant)
        .collect();

    mapped
        .nfd()
        .filter(|c| !is_stripped(*c))
        .map(map_script_variant)
        .nfc()
        .collect()
}

fn map_script_variant(c: char) -> char {
    SCRIPT_VARIANTS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
        .unwrap_or(c)
}

fn is_stripped(c: char) -> bool {
    is_arabic_mark(c) || is_invisible(c) || is_combining_mark(c)
}

fn is_arabic_mark(c: char) -> bool {
    matches!(c as u32, 0x064B..=0x065F | 0x0610..=0x061A | 0x06D6..=0x06ED)
}

fn is_invisible(c: char) -> bool {
    matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_lowercases() {
        assert_eq!(normalize("HeLLo"), "hello");
    }

    #[test]
    fn test_arabic_yeh_and_kaf_collapse() {
        assert_eq!(normalize("كيك"), "کیک");
        assert_eq!(normalize("كيك"), normalize("کیک"));
    }

    #[test]
    fn test_heh_variants_collapse() {
        assert_eq!(normalize("خانۀ"), "خانه");
        assert_eq!(normalize("مدرسة"), "مدرسه");
    }

    #[test]
    fn test_hamza_carriers_collapse() {
        assert_eq!(normalize("أ"), "ا");
        assert_eq!(normalize("إ"), "ا");
        assert_eq!(normalize("ؤ"), "و");
    }

    #[test]
    fn test_strips_harakat_and_zwnj() {
        // "mi\u{200C}ravam" with a fatha on the first letter
        assert_eq!(normalize("مَی\u{200C}روم"), "میروم");
    }

    #[test]
    fn test_strips_latin_accents() {
        assert_eq!(normalize("Café Über"), "cafe uber");
    }

    #[test]
    fn test_strips_zero_width_joiners() {
        assert_eq!(normalize("b\u{200B}a\u{200D}d\u{FEFF}"), "bad");
    }

    #[test]
    fn test_yeh_with_hamza_spellings_collapse() {
        assert_eq!(normalize("ئ"), "ی");
        assert_eq!(normalize("ی\u{0654}"), "ی");
        assert_eq!(normalize("پائیز"), normalize("پایٔیز"));
    }

    #[test]
    fn test_decomposed_heh_with_hamza_collapses() {
        assert_eq!(normalize("ە\u{0654}"), "ه");
        assert_eq!(normalize("ە"), "ه");
    }

    #[test]
    fn test_is_idempotent() {
        for text in ["Ça كيك مَی\u{200C}روم", "ئ", "خانۀ", "ە\u{0654}"] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once, "{text:?}");
        }
    }
}
