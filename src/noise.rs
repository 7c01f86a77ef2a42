//! Heuristic detection of OCR garbage lines.

use serde::Serialize;

/// Below this share of letters among non-space chars a line is noise.
const MIN_LETTER_RATIO: f64 = 0.5;
/// Repeats of one non-alphanumeric char (`-----`, `.....`) that mark noise.
const SYMBOL_RUN_LIMIT: usize = 5;
const MAX_SINGLE_CHAR_TOKEN_RATIO: f64 = 0.6;
const MIN_TOKENS_FOR_RATIO: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoiseAnalysis {
    pub letter_ratio: f64,
    pub longest_symbol_run: usize,
    pub single_char_token_ratio: f64,
    pub is_noise: bool,
}

pub fn analyze_noise(text: &str) -> NoiseAnalysis {
    let mut visible = 0usize;
    let mut letters = 0usize;
    let mut longest_run = 0usize;
    let mut run = 0usize;
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if c.is_whitespace() {
            prev = None;
            run = 0;
            continue;
        }
        visible += 1;
        if c.is_alphabetic() {
            letters += 1;
        }

        if !c.is_alphanumeric() {
            run = if prev == Some(c) { run + 1 } else { 1 };
            longest_run = longest_run.max(run);
        } else {
            run = 0;
        }
        prev = Some(c);
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let single = tokens.iter().filter(|t| t.chars().count() == 1).count();

    let letter_ratio = if visible == 0 { 0.0 } else { letters as f64 / visible as f64 };
    let single_char_token_ratio = if tokens.is_empty() {
        0.0
    } else {
        single as f64 / tokens.len() as f64
    };

    let is_noise = visible == 0
        || letter_ratio < MIN_LETTER_RATIO
        || longest_run >= SYMBOL_RUN_LIMIT
        || (tokens.len() >= MIN_TOKENS_FOR_RATIO && single_char_token_ratio > MAX_SINGLE_CHAR_TOKEN_RATIO);

    NoiseAnalysis {
        letter_ratio,
        longest_symbol_run: longest_run,
        single_char_token_ratio,
        is_noise,
    }
}

#[inline]
pub fn is_noise(text: &str) -> bool {
    analyze_noise(text).is_noise
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_arabic_is_not_noise() {
        let analysis = analyze_noise("حدثنا عبد الله بن يوسف قال أخبرنا مالك");
        assert!(!analysis.is_noise);
        assert!((analysis.letter_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_is_noise() {
        assert!(is_noise(""));
        assert!(is_noise("   \n"));
    }

    #[test]
    fn test_symbol_heavy_is_noise() {
        assert!(is_noise("%$#@ !!* 12"));
    }

    #[test]
    fn test_symbol_run() {
        let analysis = analyze_noise("الباب الأول ..........");
        assert_eq!(analysis.longest_symbol_run, 10);
        assert!(analysis.is_noise);

        // whitespace breaks a run
        assert_eq!(analyze_noise("-- -- --").longest_symbol_run, 2);
    }

    #[test]
    fn test_scattered_single_letters() {
        let analysis = analyze_noise("ا ب ت ث ج كلمة");
        assert!((analysis.single_char_token_ratio - 5.0 / 6.0).abs() < 1e-9);
        assert!(analysis.is_noise);

        // too few tokens for the ratio rule
        assert!(!is_noise("و قال"));
    }
}
