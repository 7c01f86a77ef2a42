//! Q-gram inverted index for fuzzy candidate generation.
//!
//! This module plays the role shingle filtering plays for window alignment:
//! it cheaply narrows the places where a full (bounded) edit-distance check
//! is worth running.

use crate::models::Posting;
use std::collections::{HashMap, HashSet};

/// A q-gram picked from an excerpt, with its first offset in that excerpt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub gram: String,
    pub offset: usize,
}

/// Inverted index from q-grams to their positions in pages and seams.
#[derive(Debug, Clone)]
pub struct QGramIndex {
    q: usize,
    postings: HashMap<String, Vec<Posting>>,
    frequency: HashMap<String, usize>, // occurrences, not distinct ids
}

impl QGramIndex {
    /// `q` must be positive; `MatchPolicy::validate` enforces this upstream.
    pub fn new(q: usize) -> Self {
        debug_assert!(q > 0, "q-gram length must be positive");
        Self {
            q,
            postings: HashMap::new(),
            frequency: HashMap::new(),
        }
    }

    pub fn q(&self) -> usize {
        self.q
    }

    /// Number of distinct grams indexed.
    pub fn gram_count(&self) -> usize {
        self.postings.len()
    }

    /// Record every full q-gram of `text` under `id`.
    pub fn index(&mut self, id: usize, text: &[char], is_seam: bool) {
        if self.q == 0 || text.len() < self.q {
            return;
        }

        for (pos, window) in text.windows(self.q).enumerate() {
            let gram: String = window.iter().collect();
            *self.frequency.entry(gram.clone()).or_default() += 1;
            self.postings.entry(gram).or_default().push(Posting {
                page: id,
                pos,
                seam: is_seam,
            });
        }
    }

    /// Postings of `gram`; `None` for unseen grams and grams of the wrong length.
    pub fn postings(&self, gram: &str) -> Option<&[Posting]> {
        if gram.chars().count() != self.q {
            return None;
        }
        self.postings.get(gram).map(Vec::as_slice)
    }

    /// Corpus-wide occurrence count of `gram`.
    pub fn frequency(&self, gram: &str) -> usize {
        self.frequency.get(gram).copied().unwrap_or(0)
    }

    /// Pick up to `max_seeds` grams of `excerpt`, rarest first.
    ///
    /// Unseen grams rank as infinitely frequent. If none of the rarest grams
    /// have postings, falls back to the most frequent grams that do, so very
    /// common excerpts still produce candidates.
    pub fn pick_seeds(&self, excerpt: &[char], max_seeds: usize) -> Vec<Seed> {
        if self.q == 0 || excerpt.len() < self.q || max_seeds == 0 {
            return Vec::new();
        }

        // Distinct grams with their first offset, in excerpt order
        let mut seen: HashSet<String> = HashSet::new();
        let mut ranked: Vec<(usize, Seed)> = Vec::new();
        for (offset, window) in excerpt.windows(self.q).enumerate() {
            let gram: String = window.iter().collect();
            if seen.insert(gram.clone()) {
                let freq = self.frequency.get(&gram).copied().unwrap_or(usize::MAX);
                ranked.push((freq, Seed { gram, offset }));
            }
        }

        // Stable: equal frequencies keep excerpt order
        ranked.sort_by_key(|(freq, _)| *freq);

        let has_postings = |seed: &Seed| self.postings.contains_key(&seed.gram);

        let primary: Vec<Seed> = ranked
            .iter()
            .take(max_seeds)
            .map(|(_, seed)| seed)
            .filter(|seed| has_postings(seed))
            .cloned()
            .collect();
        if !primary.is_empty() {
            return primary;
        }

        ranked
            .iter()
            .rev()
            .map(|(_, seed)| seed)
            .filter(|seed| has_postings(seed))
            .take(max_seeds)
            .cloned()
            .collect()
    }
}
