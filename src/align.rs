//! Needleman-Wunsch global alignment for token sequences.
//!
//! Drives typo correction: the original OCR pass and the reference pass are
//! aligned token by token, and every column of the alignment is later
//! resolved to the better surface token.

use crate::models::{AlignedPair, AlignmentCell, Direction, Token};
use crate::normalize::{normalize_with, NormalizeLevel};
use crate::similarity::is_similarity_above_threshold_chars;

/// Score for tokens whose normalized forms are identical.
pub const PERFECT_MATCH: i32 = 2;
/// Score for a typo symbol or tokens above the similarity threshold.
pub const SOFT_MATCH: i32 = 1;
pub const MISMATCH_PENALTY: i32 = -2;
pub const GAP_PENALTY: i32 = -1;

/// Globally align two token sequences.
///
/// Ties between recurrences are broken diagonal, then up, then left; this
/// decides which token becomes the gap when scores are equal.
///
/// The result has between `max(|A|, |B|)` and `|A| + |B|` pairs, in reading
/// order, and every input token appears exactly once.
pub fn align_token_sequences<'a, S: AsRef<str>>(
    tokens_a: &[&'a str],
    tokens_b: &[&'a str],
    typo_symbols: &[S],
    similarity_threshold: f64,
) -> Vec<AlignedPair<'a>> {
    let n = tokens_a.len();
    let m = tokens_b.len();

    // Normalize every token once instead of once per cell
    let norm_a = normalize_tokens(tokens_a);
    let norm_b = normalize_tokens(tokens_b);
    let symbol_a: Vec<bool> = tokens_a.iter().map(|t| is_symbol(t, typo_symbols)).collect();
    let symbol_b: Vec<bool> = tokens_b.iter().map(|t| is_symbol(t, typo_symbols)).collect();

    // DP matrix - flat Vec, M[i][j] = matrix[i * width + j]
    let width = m + 1;
    let mut matrix = vec![AlignmentCell::default(); (n + 1) * width];

    for i in 1..=n {
        matrix[i * width] = AlignmentCell {
            score: i as i32 * GAP_PENALTY,
            direction: Direction::Up,
        };
    }
    for j in 1..=m {
        matrix[j] = AlignmentCell {
            score: j as i32 * GAP_PENALTY,
            direction: Direction::Left,
        };
    }

    for i in 1..=n {
        let row_offset = i * width;
        let prev_row_offset = (i - 1) * width;

        for j in 1..=m {
            let pair_score = score_pair(
                &norm_a[i - 1],
                &norm_b[j - 1],
                symbol_a[i - 1] || symbol_b[j - 1],
                similarity_threshold,
            );

            let diagonal = matrix[prev_row_offset + j - 1].score + pair_score;
            let up = matrix[prev_row_offset + j].score + GAP_PENALTY;
            let left = matrix[row_offset + j - 1].score + GAP_PENALTY;

            matrix[row_offset + j] = if diagonal >= up && diagonal >= left {
                AlignmentCell {
                    score: diagonal,
                    direction: Direction::Diagonal,
                }
            } else if up >= left {
                AlignmentCell {
                    score: up,
                    direction: Direction::Up,
                }
            } else {
                AlignmentCell {
                    score: left,
                    direction: Direction::Left,
                }
            };
        }
    }

    backtrack(&matrix, width, tokens_a, tokens_b)
}

/// Walk stored directions from the bottom-right corner back to the origin.
fn backtrack<'a>(
    matrix: &[AlignmentCell],
    width: usize,
    tokens_a: &[&'a str],
    tokens_b: &[&'a str],
) -> Vec<AlignedPair<'a>> {
    let mut pairs = Vec::with_capacity(tokens_a.len() + tokens_b.len());
    let mut i = tokens_a.len();
    let mut j = tokens_b.len();

    let token_a = |i: usize| Token {
        text: tokens_a[i],
        position: i,
    };
    let token_b = |j: usize| Token {
        text: tokens_b[j],
        position: j,
    };

    while i > 0 || j > 0 {
        match matrix[i * width + j].direction {
            Direction::Diagonal => {
                pairs.push(AlignedPair {
                    a: Some(token_a(i - 1)),
                    b: Some(token_b(j - 1)),
                });
                i -= 1;
                j -= 1;
            }
            Direction::Up => {
                pairs.push(AlignedPair {
                    a: Some(token_a(i - 1)),
                    b: None,
                });
                i -= 1;
            }
            Direction::Left => {
                pairs.push(AlignedPair {
                    a: None,
                    b: Some(token_b(j - 1)),
                });
                j -= 1;
            }
            Direction::None => {
                unreachable!("alignment cell ({i}, {j}) has no direction")
            }
        }
    }

    // Alignment is built backwards, reverse it
    pairs.reverse();
    pairs
}

/// Pairwise token score on pre-normalized forms.
#[inline(always)]
fn score_pair(a: &[char], b: &[char], either_is_symbol: bool, similarity_threshold: f64) -> i32 {
    if a == b {
        PERFECT_MATCH
    } else if either_is_symbol || is_similarity_above_threshold_chars(a, b, similarity_threshold, true)
    {
        SOFT_MATCH
    } else {
        MISMATCH_PENALTY
    }
}

/// Pairwise score of two raw tokens, exposed for callers that need to reason
/// about a single column.
pub fn token_pair_score<S: AsRef<str>>(
    a: &str,
    b: &str,
    typo_symbols: &[S],
    similarity_threshold: f64,
) -> i32 {
    let norm_a: Vec<char> = normalize_with(a, NormalizeLevel::Aggressive).chars().collect();
    let norm_b: Vec<char> = normalize_with(b, NormalizeLevel::Aggressive).chars().collect();
    score_pair(
        &norm_a,
        &norm_b,
        is_symbol(a, typo_symbols) || is_symbol(b, typo_symbols),
        similarity_threshold,
    )
}

fn normalize_tokens(tokens: &[&str]) -> Vec<Vec<char>> {
    tokens
        .iter()
        .map(|t| normalize_with(t, NormalizeLevel::Aggressive).chars().collect())
        .collect()
}

#[inline]
fn is_symbol<S: AsRef<str>>(token: &str, typo_symbols: &[S]) -> bool {
    typo_symbols.iter().any(|s| s.as_ref() == token)
}
