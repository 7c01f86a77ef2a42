//! Typo correction of one OCR pass against a reference pass.
//!
//! Both texts are tokenized, aligned with Needleman-Wunsch, and every aligned
//! column is resolved to the better surface token. Adjacent near-duplicates
//! produced by gap-filling are collapsed at the end.

use indicatif::{ProgressBar, ProgressStyle};
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;

use crate::align::align_token_sequences;
use crate::models::{AlignedPair, ConfigError, TypoFixParams, TypoPair};
use crate::normalize::{normalize_with, tokenize, NormalizeLevel};
use crate::similarity::is_similarity_above_threshold;

lazy_static! {
    // (1) [2] (١٢) as a token of its own
    static ref STANDALONE_FOOTNOTE: Regex =
        Regex::new(r"^[(\[]\s*[0-9٠-٩]+\s*[)\]]$").unwrap();
    // word(1) or word[٢]
    static ref TRAILING_FOOTNOTE: Regex =
        Regex::new(r"^(?P<body>.+?)[(\[][0-9٠-٩]+[)\]]$").unwrap();
    // (1)word
    static ref LEADING_FOOTNOTE: Regex =
        Regex::new(r"^[(\[][0-9٠-٩]+[)\]](?P<body>.+)$").unwrap();
}

/// Correct `original` against `reference` and return the fixed text, tokens
/// joined with single spaces.
pub fn fix_typo(original: &str, reference: &str, params: &TypoFixParams) -> Result<String, ConfigError> {
    params.validate()?;
    Ok(fix_validated(original, reference, params))
}

/// [`fix_typo`] over many pairs in parallel; output order follows input order.
pub fn fix_typos_batch(
    pairs: &[TypoPair],
    params: &TypoFixParams,
    show_progress: bool,
) -> Result<Vec<String>, ConfigError> {
    params.validate()?;

    let progress = if show_progress {
        let pb = ProgressBar::new(pairs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let fixed: Vec<String> = pairs
        .par_iter()
        .map(|pair| {
            let text = fix_validated(&pair.original, &pair.reference, params);
            if let Some(ref pb) = progress {
                pb.inc(1);
            }
            text
        })
        .collect();

    if let Some(pb) = progress {
        pb.finish_with_message("Done");
    }

    log::debug!("fixed {} document pairs", fixed.len());
    Ok(fixed)
}

fn fix_validated(original: &str, reference: &str, params: &TypoFixParams) -> String {
    let tokens_a = tokenize(original, &params.typo_symbols);
    let tokens_b = tokenize(reference, &params.typo_symbols);

    let pairs = align_token_sequences(
        &tokens_a,
        &tokens_b,
        &params.typo_symbols,
        params.similarity_threshold,
    );
    log::trace!(
        "aligned {} x {} tokens into {} pairs",
        tokens_a.len(),
        tokens_b.len(),
        pairs.len()
    );

    let selected: Vec<&str> = pairs
        .iter()
        .flat_map(|pair| select_best_tokens(pair, params))
        .collect();

    remove_duplicate_tokens(&selected, params.high_similarity_threshold).join(" ")
}

/// Resolve one aligned column to its surface token(s); the original side is
/// `a`, the reference side `b`.
///
/// Returns two tokens only when one side is a standalone footnote marker, so
/// that the marker survives next to the body text.
pub fn select_best_tokens<'a>(pair: &AlignedPair<'a>, params: &TypoFixParams) -> Vec<&'a str> {
    let (original, reference) = match (pair.a_text(), pair.b_text()) {
        (Some(a), Some(b)) => (a, b),
        (Some(only), None) | (None, Some(only)) => return vec![only],
        (None, None) => return Vec::new(),
    };

    if normalize_with(original, NormalizeLevel::Aggressive)
        == normalize_with(reference, NormalizeLevel::Aggressive)
    {
        return vec![original];
    }

    if let Some(tokens) = resolve_footnote(original, reference) {
        return tokens;
    }

    if params.is_typo_symbol(original) {
        return vec![original];
    }
    if params.is_typo_symbol(reference) {
        return vec![reference];
    }

    if is_similarity_above_threshold(original, reference, params.similarity_threshold, false) {
        vec![original]
    } else {
        vec![reference]
    }
}

fn resolve_footnote<'a>(original: &'a str, reference: &'a str) -> Option<Vec<&'a str>> {
    match (is_standalone_footnote(original), is_standalone_footnote(reference)) {
        (true, false) | (false, true) => return Some(vec![original, reference]),
        (true, true) => return None,
        (false, false) => {}
    }

    let same_body = |footnoted: &str, plain: &str| {
        footnote_body(footnoted).is_some_and(|body| {
            normalize_with(body, NormalizeLevel::Aggressive) == normalize_with(plain, NormalizeLevel::Aggressive)
        })
    };

    if same_body(original, reference) {
        Some(vec![original])
    } else if same_body(reference, original) {
        Some(vec![reference])
    } else {
        None
    }
}

pub fn is_standalone_footnote(token: &str) -> bool {
    STANDALONE_FOOTNOTE.is_match(token)
}

/// Word part of a token carrying an attached footnote marker.
pub fn footnote_body(token: &str) -> Option<&str> {
    if is_standalone_footnote(token) {
        return None;
    }
    TRAILING_FOOTNOTE
        .captures(token)
        .or_else(|| LEADING_FOOTNOTE.captures(token))
        .and_then(|caps| caps.name("body"))
        .map(|body| body.as_str())
}

/// Collapse adjacent near-duplicate tokens.
///
/// A token similar (inclusive, after normalization and footnote stripping)
/// to the previously kept token is dropped; a footnoted variant replaces a
/// plain kept one instead.
pub fn remove_duplicate_tokens<'a>(tokens: &[&'a str], high_similarity_threshold: f64) -> Vec<&'a str> {
    let mut kept: Vec<&'a str> = Vec::with_capacity(tokens.len());

    for &token in tokens {
        if let Some(last) = kept.last_mut() {
            if is_near_duplicate(last, token, high_similarity_threshold) {
                if footnote_body(token).is_some() && footnote_body(last).is_none() {
                    *last = token;
                }
                continue;
            }
        }
        kept.push(token);
    }

    kept
}

fn is_near_duplicate(a: &str, b: &str, threshold: f64) -> bool {
    let norm_a = normalize_with(footnote_body(a).unwrap_or(a), NormalizeLevel::Aggressive);
    let norm_b = normalize_with(footnote_body(b).unwrap_or(b), NormalizeLevel::Aggressive);

    // Pure punctuation normalizes away; only identical marks collapse
    if norm_a.is_empty() || norm_b.is_empty() {
        return a == b;
    }
    is_similarity_above_threshold(&norm_a, &norm_b, threshold, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Token;

    fn params(symbols: &[&str], similarity: f64, high: f64) -> TypoFixParams {
        TypoFixParams {
            typo_symbols: symbols.iter().map(|s| s.to_string()).collect(),
            similarity_threshold: similarity,
            high_similarity_threshold: high,
        }
    }

    fn pair<'a>(a: Option<&'a str>, b: Option<&'a str>) -> AlignedPair<'a> {
        AlignedPair {
            a: a.map(|text| Token { text, position: 0 }),
            b: b.map(|text| Token { text, position: 0 }),
        }
    }

    #[test]
    fn test_honorific_symbol_inserted_inline() {
        let fixed = fix_typo(
            "محمد صلى الله عليه وسلم رسول الله",
            "محمد ﷺ رسول الله",
            &params(&["ﷺ"], 0.7, 0.9),
        )
        .unwrap();
        assert_eq!(fixed, "محمد صلى الله عليه ﷺ رسول الله");
    }

    #[test]
    fn test_reference_fixes_ocr_typo() {
        // "الكتان" is an OCR misread of "الكتاب"; ratio 5/6 is below 0.9
        let fixed = fix_typo("قرأت الكتان اليوم", "قرأت الكتاب اليوم", &params(&[], 0.9, 0.9)).unwrap();
        assert_eq!(fixed, "قرأت الكتاب اليوم");
    }

    #[test]
    fn test_original_kept_when_close_enough() {
        let fixed = fix_typo("قرأت الكتان اليوم", "قرأت الكتاب اليوم", &params(&[], 0.6, 0.9)).unwrap();
        assert_eq!(fixed, "قرأت الكتان اليوم");
    }

    #[test]
    fn test_diacritics_of_original_survive() {
        let fixed = fix_typo("قَالَ النَّبِيُّ", "قال النبي", &TypoFixParams::default()).unwrap();
        assert_eq!(fixed, "قَالَ النَّبِيُّ");
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(fix_typo("a", "b", &params(&[], 1.5, 0.9)).is_err());
        assert!(fix_typos_batch(&[], &params(&[], 0.5, f64::NAN), false).is_err());
    }

    #[test]
    fn test_select_gap_keeps_present_token() {
        let p = TypoFixParams::default();
        assert_eq!(select_best_tokens(&pair(Some("x"), None), &p), vec!["x"]);
        assert_eq!(select_best_tokens(&pair(None, Some("y")), &p), vec!["y"]);
    }

    #[test]
    fn test_select_normalized_equal_keeps_original() {
        let p = TypoFixParams::default();
        assert_eq!(select_best_tokens(&pair(Some("مدرسة"), Some("مدرسه")), &p), vec!["مدرسة"]);
    }

    #[test]
    fn test_select_symbol_wins() {
        let p = params(&["ﷺ"], 0.7, 0.9);
        assert_eq!(select_best_tokens(&pair(Some("وسلم"), Some("ﷺ")), &p), vec!["ﷺ"]);
        assert_eq!(select_best_tokens(&pair(Some("ﷺ"), Some("وسلم")), &p), vec!["ﷺ"]);
    }

    #[test]
    fn test_select_standalone_footnote_keeps_both() {
        let p = TypoFixParams::default();
        assert_eq!(
            select_best_tokens(&pair(Some("(١)"), Some("الحديث")), &p),
            vec!["(١)", "الحديث"]
        );
        assert_eq!(
            select_best_tokens(&pair(Some("الحديث"), Some("[2]")), &p),
            vec!["الحديث", "[2]"]
        );
    }

    #[test]
    fn test_select_embedded_footnote() {
        let p = TypoFixParams::default();
        assert_eq!(
            select_best_tokens(&pair(Some("الحديث"), Some("الحديث(٣)")), &p),
            vec!["الحديث(٣)"]
        );
        assert_eq!(
            select_best_tokens(&pair(Some("(1)الحديث"), Some("الحديث")), &p),
            vec!["(1)الحديث"]
        );
    }

    #[test]
    fn test_footnote_detection() {
        assert!(is_standalone_footnote("(12)"));
        assert!(is_standalone_footnote("[ ٤ ]"));
        assert!(!is_standalone_footnote("(a)"));
        assert_eq!(footnote_body("كلمة(٥)"), Some("كلمة"));
        assert_eq!(footnote_body("[7]كلمة"), Some("كلمة"));
        assert_eq!(footnote_body("(5)"), None);
        assert_eq!(footnote_body("كلمة"), None);
    }

    #[test]
    fn test_remove_adjacent_duplicates() {
        let tokens = ["الله", "الله", "اكبر"];
        assert_eq!(remove_duplicate_tokens(&tokens, 0.9), vec!["الله", "اكبر"]);

        // diacritics and hamza variants do not count as differences
        let tokens = ["أَكْبَر", "اكبر"];
        assert_eq!(remove_duplicate_tokens(&tokens, 0.9), vec!["أَكْبَر"]);

        // non-adjacent repeats stay
        let tokens = ["a", "b", "a"];
        assert_eq!(remove_duplicate_tokens(&tokens, 0.9), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_footnoted_duplicate_replaces_plain() {
        let tokens = ["الحديث", "الحديث(٣)", "صحيح"];
        assert_eq!(remove_duplicate_tokens(&tokens, 0.9), vec!["الحديث(٣)", "صحيح"]);

        let tokens = ["الحديث(٣)", "الحديث"];
        assert_eq!(remove_duplicate_tokens(&tokens, 0.9), vec!["الحديث(٣)"]);
    }

    #[test]
    fn test_punctuation_tokens_compare_verbatim() {
        let tokens = ["،", ".", ".", "نعم"];
        assert_eq!(remove_duplicate_tokens(&tokens, 0.9), vec!["،", ".", "نعم"]);
    }

    #[test]
    fn test_batch_preserves_order() {
        let pairs = vec![
            TypoPair {
                original: "قرأت الكتان".to_string(),
                reference: "قرأت الكتاب".to_string(),
            },
            TypoPair {
                original: "محمد صلى الله عليه وسلم".to_string(),
                reference: "محمد ﷺ".to_string(),
            },
        ];
        let fixed = fix_typos_batch(&pairs, &params(&["ﷺ"], 0.9, 0.9), false).unwrap();
        assert_eq!(fixed[0], "قرأت الكتاب");
        assert_eq!(fixed[1], fix_typo(&pairs[1].original, &pairs[1].reference, &params(&["ﷺ"], 0.9, 0.9)).unwrap());
    }
}
