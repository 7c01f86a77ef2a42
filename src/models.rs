//! Data structures for the Kashshaf OCR post-processing pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors, raised at call time before any work is done.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive")]
    NonPositive { field: &'static str },
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

/// A whitespace-delimited unit of text and its index in the token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub position: usize,
}

/// One column of a global alignment. At most one side is a gap (`None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedPair<'a> {
    pub a: Option<Token<'a>>,
    pub b: Option<Token<'a>>,
}

impl<'a> AlignedPair<'a> {
    /// Surface text of the A side, if present.
    pub fn a_text(&self) -> Option<&'a str> {
        self.a.map(|t| t.text)
    }

    /// Surface text of the B side, if present.
    pub fn b_text(&self) -> Option<&'a str> {
        self.b.map(|t| t.text)
    }

    pub fn is_gap(&self) -> bool {
        self.a.is_none() || self.b.is_none()
    }
}

/// Which recurrence produced a DP cell's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    None,
    Diagonal,
    Up,
    Left,
}

/// One cell of the Needleman-Wunsch matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignmentCell {
    pub score: i32,
    pub direction: Direction,
}

/// One occurrence of a q-gram: page (or seam) id, char offset, seam flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub page: usize,
    pub pos: usize,
    pub seam: bool,
}

/// A hypothesized fuzzy match location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub page: usize,
    pub start: usize,
    pub seam: bool,
}

/// Best known match quality of one excerpt on one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageHit {
    pub score: f64, // 1.0 for exact hits, 1 - dist/acceptance for fuzzy hits
    pub exact: bool,
    pub seam: bool, // derived from a seam buffer (page boundary with page + 1)
}

impl PageHit {
    pub fn exact() -> Self {
        PageHit {
            score: 1.0,
            exact: true,
            seam: false,
        }
    }

    /// Whether `other` should replace `self` as the best hit for a page.
    pub fn is_improved_by(&self, other: &PageHit) -> bool {
        if self.exact {
            return false;
        }
        if other.exact {
            return true;
        }
        other.score > self.score || (other.score == self.score && self.seam && !other.seam)
    }
}

/// Largest accepted `max_edit_abs`; anything above is a configuration mistake.
pub const MAX_EDIT_ABS_LIMIT: usize = u32::MAX as usize;

/// Fuzzy matching policy. All fields are mandatory; build one from
/// [`MatchPolicyOverrides`] to apply defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPolicy {
    pub enable_fuzzy: bool,
    pub max_edit_abs: usize,
    pub max_edit_rel: f64, // fraction of excerpt length
    pub q: usize,
    pub grams_per_excerpt: usize,
    pub max_candidates_per_excerpt: usize,
    pub seam_len: usize, // chars taken from each side of a page boundary
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            enable_fuzzy: true,
            max_edit_abs: 3,
            max_edit_rel: 0.1,
            q: 4,
            grams_per_excerpt: 5,
            max_candidates_per_excerpt: 40,
            seam_len: 512,
        }
    }
}

impl MatchPolicy {
    /// Check every field; never clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("q", self.q)?;
        require_positive("grams_per_excerpt", self.grams_per_excerpt)?;
        require_positive("max_candidates_per_excerpt", self.max_candidates_per_excerpt)?;
        require_positive("seam_len", self.seam_len)?;
        require_unit_interval("max_edit_rel", self.max_edit_rel)?;
        require_at_most("max_edit_abs", self.max_edit_abs, MAX_EDIT_ABS_LIMIT)?;
        Ok(())
    }

    /// Maximum edit distance allowed for an excerpt of `excerpt_len` chars.
    pub fn max_distance_for(&self, excerpt_len: usize) -> usize {
        let relative = (self.max_edit_rel * excerpt_len as f64).ceil() as usize;
        self.max_edit_abs.max(relative)
    }
}

/// User-supplied policy fields; anything left out falls back to the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPolicyOverrides {
    pub enable_fuzzy: Option<bool>,
    pub max_edit_abs: Option<usize>,
    pub max_edit_rel: Option<f64>,
    pub q: Option<usize>,
    pub grams_per_excerpt: Option<usize>,
    pub max_candidates_per_excerpt: Option<usize>,
    pub seam_len: Option<usize>,
}

impl MatchPolicyOverrides {
    /// Overlay onto [`MatchPolicy::default`] and validate the result.
    pub fn resolve(&self) -> Result<MatchPolicy, ConfigError> {
        let defaults = MatchPolicy::default();
        let policy = MatchPolicy {
            enable_fuzzy: self.enable_fuzzy.unwrap_or(defaults.enable_fuzzy),
            max_edit_abs: self.max_edit_abs.unwrap_or(defaults.max_edit_abs),
            max_edit_rel: self.max_edit_rel.unwrap_or(defaults.max_edit_rel),
            q: self.q.unwrap_or(defaults.q),
            grams_per_excerpt: self.grams_per_excerpt.unwrap_or(defaults.grams_per_excerpt),
            max_candidates_per_excerpt: self
                .max_candidates_per_excerpt
                .unwrap_or(defaults.max_candidates_per_excerpt),
            seam_len: self.seam_len.unwrap_or(defaults.seam_len),
        };
        policy.validate()?;
        Ok(policy)
    }
}

/// Parameters for typo correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypoFixParams {
    pub typo_symbols: Vec<String>,      // e.g. honorific glyphs such as ﷺ
    pub similarity_threshold: f64,      // soft-match / keep-original threshold
    pub high_similarity_threshold: f64, // adjacent duplicate collapse threshold
}

impl Default for TypoFixParams {
    fn default() -> Self {
        Self {
            typo_symbols: Vec::new(),
            similarity_threshold: 0.6,
            high_similarity_threshold: 0.8,
        }
    }
}

impl TypoFixParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_unit_interval("similarity_threshold", self.similarity_threshold)?;
        require_unit_interval("high_similarity_threshold", self.high_similarity_threshold)?;
        Ok(())
    }

    pub fn is_typo_symbol(&self, token: &str) -> bool {
        self.typo_symbols.iter().any(|s| s == token)
    }
}

/// One OCR pass and its reference pass, as read from a batch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypoPair {
    pub original: String,
    pub reference: String,
}

fn require_positive(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NonPositive { field });
    }
    Ok(())
}

fn require_at_most(field: &'static str, value: usize, max: usize) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value: value as f64,
            min: 0.0,
            max: max as f64,
        });
    }
    Ok(())
}

fn require_unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(())
}
