//! Arabic-aware text normalization and tokenization.
//!
//! Exact and fuzzy matching are defined relative to [`normalize`]: two texts
//! "match exactly" when their normalized forms do.

use unicode_categories::UnicodeCategories;
use unicode_normalization::UnicodeNormalization;

/// How much information normalization is allowed to discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizeLevel {
    /// Compatibility forms (NFKC), diacritics, tatweel, invisible controls,
    /// alif variants, whitespace.
    #[default]
    Light,
    /// Light, plus ya/ta-marbuta/hamza-carrier folding, Unicode punctuation
    /// removal and lowercasing. Used when comparing individual tokens.
    Aggressive,
}

/// Light normalization used for page/excerpt matching.
#[inline]
pub fn normalize(text: &str) -> String {
    normalize_with(text, NormalizeLevel::Light)
}

/// Normalize `text` at the given level. Idempotent for both levels.
pub fn normalize_with(text: &str, level: NormalizeLevel) -> String {
    let aggressive = level == NormalizeLevel::Aggressive;
    let folded_text = compatibility_fold(text);
    let mut out = String::with_capacity(folded_text.len());
    let mut pending_space = false;

    for c in folded_text.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if is_diacritic(c) || is_invisible(c) || c == '\u{0640}' {
            continue;
        }
        if aggressive && is_punctuation(c) {
            continue;
        }

        let folded = match c {
            'أ' | 'إ' | 'آ' | 'ٱ' => 'ا',
            'ى' if aggressive => 'ي',
            'ة' if aggressive => 'ه',
            'ؤ' if aggressive => 'و',
            'ئ' if aggressive => 'ي',
            _ => c,
        };

        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if aggressive && folded.is_ascii_uppercase() {
            out.push(folded.to_ascii_lowercase());
        } else if aggressive && folded.is_uppercase() {
            out.extend(folded.to_lowercase());
        } else {
            out.push(folded);
        }
    }

    out
}

/// Arabic harakat, tanwin, shadda, sukun, superscript alif and Quranic marks.
#[inline]
pub fn is_diacritic(c: char) -> bool {
    matches!(c,
        '\u{0610}'..='\u{061A}'
        | '\u{064B}'..='\u{065F}'
        | '\u{0670}'
        | '\u{06D6}'..='\u{06DC}'
        | '\u{06DF}'..='\u{06E8}'
        | '\u{06EA}'..='\u{06ED}')
}

/// Zero-width characters, bidi controls and the BOM.
#[inline]
fn is_invisible(c: char) -> bool {
    matches!(c,
        '\u{200B}'..='\u{200F}'
        | '\u{202A}'..='\u{202E}'
        | '\u{2066}'..='\u{2069}'
        | '\u{FEFF}')
}

/// NFKC, except for the Arabic word ligatures (ﷲ, ﷺ and friends), which
/// stay single glyphs so they can still act as typo symbols.
///
/// Presentation forms from PDF extraction fold back to base letters here.
fn compatibility_fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut segment_start = 0;

    for (i, c) in text.char_indices() {
        if is_word_ligature(c) {
            out.extend(text[segment_start..i].nfkc());
            out.push(c);
            segment_start = i + c.len_utf8();
        }
    }
    out.extend(text[segment_start..].nfkc());

    out
}

#[inline]
fn is_word_ligature(c: char) -> bool {
    matches!(c, '\u{FDF0}'..='\u{FDFD}')
}

#[inline]
fn is_punctuation(c: char) -> bool {
    // Arabic marks listed explicitly, whatever the category table version says
    c.is_punctuation() || matches!(c, '،' | '؛' | '؟' | '٪' | '۔' | '﴾' | '﴿')
}

/// Split `text` on whitespace, keeping every occurrence of a preserve symbol
/// as its own token even when glued to neighbouring characters.
///
/// At a given position the longest matching symbol wins.
pub fn tokenize<'a, S: AsRef<str>>(text: &'a str, preserve_symbols: &[S]) -> Vec<&'a str> {
    let mut tokens = Vec::new();
    for chunk in text.split_whitespace() {
        split_symbols(chunk, preserve_symbols, &mut tokens);
    }
    tokens
}

fn split_symbols<'a, S: AsRef<str>>(chunk: &'a str, symbols: &[S], out: &mut Vec<&'a str>) {
    let mut piece_start = 0;
    let mut i = 0;

    while i < chunk.len() {
        let rest = &chunk[i..];
        let matched = symbols
            .iter()
            .map(AsRef::as_ref)
            .filter(|s| !s.is_empty() && rest.starts_with(*s))
            .map(str::len)
            .max();

        match matched {
            Some(len) => {
                if piece_start < i {
                    out.push(&chunk[piece_start..i]);
                }
                out.push(&chunk[i..i + len]);
                i += len;
                piece_start = i;
            }
            None => {
                i += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if piece_start < chunk.len() {
        out.push(&chunk[piece_start..]);
    }
}
