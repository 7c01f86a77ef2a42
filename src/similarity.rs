//! Normalized similarity ratios derived from edit distance.
//!
//! Threshold predicates are evaluated distance-first: the threshold is turned
//! into an integer edit-distance ceiling and checked with the banded
//! Levenshtein, so boundary cases never depend on how a float ratio rounds.
//!
//! Rounding rule (with `EPSILON = 1e-9`):
//! - inclusive, `ratio >= t`: `d <= floor((1 - t) * max_len + EPSILON)`
//! - exclusive, `ratio > t`: `d <= ceil((1 - t) * max_len - EPSILON) - 1`

use crate::distance::{bounded_levenshtein_chars, levenshtein_chars};
use crate::normalize::{normalize_with, NormalizeLevel};

/// Tolerance for threshold comparisons.
pub const EPSILON: f64 = 1e-9;

/// `(max_len - distance) / max_len`, 1.0 for two empty strings.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    similarity_ratio_chars(&a, &b)
}

pub fn similarity_ratio_chars(a: &[char], b: &[char]) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein_chars(a, b);
    (max_len - distance) as f64 / max_len as f64
}

/// Largest edit distance that still satisfies the threshold for strings whose
/// longer side has `max_len` chars. `None` means no distance qualifies.
pub fn max_distance_for_threshold(max_len: usize, threshold: f64, inclusive: bool) -> Option<usize> {
    let slack = (1.0 - threshold) * max_len as f64;
    let ceiling = if inclusive {
        (slack + EPSILON).floor()
    } else {
        (slack - EPSILON).ceil() - 1.0
    };

    if ceiling < 0.0 {
        None
    } else {
        Some(ceiling as usize)
    }
}

/// Whether the similarity ratio of `a` and `b` reaches `threshold`
/// (`>=` when `inclusive`, `>` otherwise).
pub fn is_similarity_above_threshold(a: &str, b: &str, threshold: f64, inclusive: bool) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    is_similarity_above_threshold_chars(&a, &b, threshold, inclusive)
}

pub fn is_similarity_above_threshold_chars(
    a: &[char],
    b: &[char],
    threshold: f64,
    inclusive: bool,
) -> bool {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        // Two empty strings have ratio 1.0
        return if inclusive {
            threshold <= 1.0 + EPSILON
        } else {
            threshold < 1.0 - EPSILON
        };
    }

    match max_distance_for_threshold(max_len, threshold, inclusive) {
        Some(max_dist) => bounded_levenshtein_chars(a, b, max_dist) <= max_dist,
        None => false,
    }
}

/// Inclusive threshold check on aggressively normalized forms.
pub fn are_similar_after_normalization(a: &str, b: &str, threshold: f64) -> bool {
    let a = normalize_with(a, NormalizeLevel::Aggressive);
    let b = normalize_with(b, NormalizeLevel::Aggressive);
    is_similarity_above_threshold(&a, &b, threshold, true)
}
