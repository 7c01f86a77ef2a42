//! Kashshaf OCR Post-Processing Library
//!
//! Cleans up OCR output for premodern Arabic books. Corrects typos in one OCR
//! pass by aligning it token by token against a reference pass, and locates
//! excerpts in a paginated book with an exact Aho-Corasick pass followed by a
//! q-gram seeded, edit-distance bounded fuzzy pass.
//!
//! # Example
//!
//! ```no_run
//! use kashshaf_ocr::prelude::*;
//!
//! let params = TypoFixParams {
//!     typo_symbols: vec!["ﷺ".to_string()],
//!     similarity_threshold: 0.7,
//!     high_similarity_threshold: 0.9,
//! };
//!
//! let fixed = fix_typo("محمد صلى الله عليه وسلم رسول الله", "محمد ﷺ رسول الله", &params).unwrap();
//! println!("{}", fixed);
//! ```
//!
//! # Excerpt Matching Example
//!
//! ```no_run
//! use kashshaf_ocr::prelude::*;
//!
//! let pages = vec!["page one text", "page two has target phrase"];
//! let excerpts = vec!["target phrase", "targt phrase"];
//!
//! // Defaults applied once, then validated
//! let policy = MatchPolicyOverrides::default().resolve().unwrap();
//!
//! let best = find_best_page_per_excerpt(&pages, &excerpts, &policy).unwrap();
//! for (excerpt, page) in excerpts.iter().zip(&best) {
//!     println!("{} -> {:?}", excerpt, page);
//! }
//! ```

pub mod align;
pub mod automaton;
pub mod balance;
pub mod book;
pub mod distance;
pub mod matcher;
pub mod models;
pub mod noise;
pub mod normalize;
pub mod output;
pub mod qgram;
pub mod similarity;
pub mod typo;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::align::{align_token_sequences, token_pair_score};
    pub use crate::automaton::{PatternAutomaton, PatternAutomatonBuilder};
    pub use crate::balance::{are_brackets_balanced, check_balance, BalanceError, BalanceReport};
    pub use crate::book::{Book, PageOffset};
    pub use crate::distance::{
        bounded_levenshtein, bounded_levenshtein_chars, bounded_substring_distance, levenshtein,
        levenshtein_chars,
    };
    pub use crate::matcher::{
        find_all_matches_per_excerpt, find_all_pages_per_excerpt, find_best_page_per_excerpt,
        PageMatch,
    };
    pub use crate::models::{
        AlignedPair, AlignmentCell, Candidate, ConfigError, Direction, MatchPolicy,
        MatchPolicyOverrides, PageHit, Posting, Token, TypoFixParams, TypoPair,
    };
    pub use crate::noise::{analyze_noise, is_noise, NoiseAnalysis};
    pub use crate::normalize::{normalize, normalize_with, tokenize, NormalizeLevel};
    pub use crate::output::{
        check_lines, format_excerpt_report, format_page_list, print_excerpt_reports,
        print_line_checks, print_match_summary, read_json_file, write_json, write_json_file,
        ExcerptReport, LineCheck, MatchReport, OutputError,
    };
    pub use crate::qgram::{QGramIndex, Seed};
    pub use crate::similarity::{
        are_similar_after_normalization, is_similarity_above_threshold, similarity_ratio,
    };
    pub use crate::typo::{fix_typo, fix_typos_batch, remove_duplicate_tokens, select_best_tokens};
}

// Re-export commonly used types at the crate root
pub use matcher::{find_all_pages_per_excerpt, find_best_page_per_excerpt};
pub use models::{ConfigError, MatchPolicy, MatchPolicyOverrides, TypoFixParams};
pub use typo::fix_typo;
