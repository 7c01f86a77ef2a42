//! Excerpt-to-page matching orchestration.
//!
//! This module coordinates the full matching pipeline: normalization, excerpt
//! deduplication, the exact Aho-Corasick pass over the joined book, and the
//! fuzzy q-gram + bounded edit-distance pass for whatever is left.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::automaton::PatternAutomatonBuilder;
use crate::book::Book;
use crate::distance::bounded_substring_distance;
use crate::models::{Candidate, ConfigError, MatchPolicy, PageHit};
use crate::normalize::normalize;
use crate::qgram::QGramIndex;

/// Minimum extra window slack, in chars, on each side of a candidate.
const MIN_WINDOW_EXTRA: usize = 6;
/// Window slack as a fraction of the excerpt length.
const WINDOW_EXTRA_RATIO: f64 = 0.12;
/// Largest extra edit distance granted to boundary-spanning candidates.
const BOUNDARY_BONUS_CAP: usize = 2;

/// One ranked page for an excerpt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageMatch {
    pub page: usize,
    pub score: f64,
    pub exact: bool,
    pub seam: bool,
}

/// Best page for every excerpt, in input order; `None` when nothing matches
/// within the policy.
///
/// Exact hits always take precedence: fuzzy matching only runs for excerpts
/// without one, and only when `policy.enable_fuzzy` is set.
pub fn find_best_page_per_excerpt<P: AsRef<str>, E: AsRef<str>>(
    pages: &[P],
    excerpts: &[E],
    policy: &MatchPolicy,
) -> Result<Vec<Option<usize>>, ConfigError> {
    policy.validate()?;

    let input = PreparedInput::new(pages, excerpts);
    let exact = exact_pages(&input.book, &input.distinct);
    let mut best: Vec<Option<usize>> = exact.iter().map(|pages| pages.first().copied()).collect();

    let pending: Vec<usize> = (0..input.distinct.len())
        .filter(|&i| best[i].is_none() && input.distinct[i].len() >= policy.q)
        .collect();

    if policy.enable_fuzzy && !pending.is_empty() {
        let corpus = FuzzyCorpus::build(&input.book, policy);
        let found: Vec<(usize, Option<usize>)> = pending
            .par_iter()
            .map(|&i| (i, corpus.best_page(&input.distinct[i])))
            .collect();

        let fuzzy_hits = found.iter().filter(|(_, page)| page.is_some()).count();
        log::debug!("fuzzy pass matched {}/{} excerpts", fuzzy_hits, pending.len());

        for (i, page) in found {
            best[i] = page;
        }
    }

    Ok(input.spread(&best))
}

/// Every matching page for every excerpt, ranked best-first.
pub fn find_all_pages_per_excerpt<P: AsRef<str>, E: AsRef<str>>(
    pages: &[P],
    excerpts: &[E],
    policy: &MatchPolicy,
) -> Result<Vec<Vec<usize>>, ConfigError> {
    let ranked = find_all_matches_per_excerpt(pages, excerpts, policy)?;
    Ok(ranked
        .into_iter()
        .map(|matches| matches.into_iter().map(|m| m.page).collect())
        .collect())
}

/// Like [`find_all_pages_per_excerpt`], keeping the score and origin of
/// every hit.
///
/// Ranking: exact hits first by ascending page, then fuzzy hits by
/// descending score, ties by ascending page.
pub fn find_all_matches_per_excerpt<P: AsRef<str>, E: AsRef<str>>(
    pages: &[P],
    excerpts: &[E],
    policy: &MatchPolicy,
) -> Result<Vec<Vec<PageMatch>>, ConfigError> {
    policy.validate()?;

    let input = PreparedInput::new(pages, excerpts);
    let exact = exact_pages(&input.book, &input.distinct);

    let mut hits: Vec<BTreeMap<usize, PageHit>> = exact
        .iter()
        .map(|pages| pages.iter().map(|&p| (p, PageHit::exact())).collect())
        .collect();

    let pending: Vec<usize> = (0..input.distinct.len())
        .filter(|&i| hits[i].is_empty() && input.distinct[i].len() >= policy.q)
        .collect();

    if policy.enable_fuzzy && !pending.is_empty() {
        let corpus = FuzzyCorpus::build(&input.book, policy);
        let found: Vec<(usize, BTreeMap<usize, PageHit>)> = pending
            .par_iter()
            .map(|&i| (i, corpus.page_hits(&input.distinct[i])))
            .collect();

        for (i, page_hits) in found {
            hits[i] = page_hits;
        }
    }

    let ranked: Vec<Vec<PageMatch>> = hits
        .into_iter()
        .map(|mut page_hits| {
            prune_seam_hits(&mut page_hits);
            rank_hits(&page_hits)
        })
        .collect();

    Ok(input.spread(&ranked))
}

/// Normalized book plus deduplicated normalized excerpts.
struct PreparedInput {
    book: Book,
    distinct: Vec<Vec<char>>,
    slot_of: Vec<usize>, // original excerpt index -> distinct index
}

impl PreparedInput {
    fn new<P: AsRef<str>, E: AsRef<str>>(pages: &[P], excerpts: &[E]) -> Self {
        let book = Book::from_pages(pages);

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut distinct = Vec::new();
        let mut slot_of = Vec::with_capacity(excerpts.len());

        for excerpt in excerpts {
            let normalized = normalize(excerpt.as_ref());
            let slot = *seen.entry(normalized).or_insert_with_key(|key| {
                distinct.push(key.chars().collect());
                distinct.len() - 1
            });
            slot_of.push(slot);
        }

        log::debug!(
            "prepared {} pages ({} chars), {} excerpts ({} distinct)",
            book.page_count(),
            book.text().len(),
            excerpts.len(),
            distinct.len()
        );

        Self {
            book,
            distinct,
            slot_of,
        }
    }

    /// Fan per-distinct results back out to input order.
    fn spread<T: Clone>(&self, per_distinct: &[T]) -> Vec<T> {
        self.slot_of.iter().map(|&slot| per_distinct[slot].clone()).collect()
    }
}

/// Pages holding a verbatim occurrence of each excerpt, ascending.
///
/// The first entry is the page of the first occurrence in the book.
fn exact_pages(book: &Book, excerpts: &[Vec<char>]) -> Vec<Vec<usize>> {
    let mut builder = PatternAutomatonBuilder::new();
    for (id, excerpt) in excerpts.iter().enumerate() {
        if !excerpt.is_empty() {
            let pattern: String = excerpt.iter().collect();
            builder.add(&pattern, id);
        }
    }
    let automaton = builder.build();

    let mut pages: Vec<Vec<usize>> = vec![Vec::new(); excerpts.len()];
    automaton.scan_chars(book.text(), |id, end| {
        let start = end - excerpts[id].len();
        if let Some(page) = book.page_of(start) {
            // Ends arrive in order, so pages per excerpt are non-decreasing
            if pages[id].last() != Some(&page) {
                pages[id].push(page);
            }
        }
    });

    log::debug!(
        "exact pass: {}/{} excerpts found",
        pages.iter().filter(|p| !p.is_empty()).count(),
        excerpts.len()
    );

    pages
}

/// Outcome of checking one candidate window.
#[derive(Debug, Clone, Copy)]
struct Evaluation {
    distance: usize,
    acceptance: usize,
    seam: bool,
}

impl Evaluation {
    fn score(&self) -> f64 {
        if self.acceptance == 0 {
            1.0
        } else {
            1.0 - self.distance as f64 / self.acceptance as f64
        }
    }
}

/// Boundary buffer joining page `p` and page `p + 1`.
struct Seam {
    text: Vec<char>,
    split: usize, // index of the separator space
}

/// Read-only structures for the fuzzy pass, shared across excerpts.
struct FuzzyCorpus<'a> {
    book: &'a Book,
    seams: Vec<Seam>, // seams[p] joins page p and page p + 1
    index: QGramIndex,
    policy: &'a MatchPolicy,
}

impl<'a> FuzzyCorpus<'a> {
    fn build(book: &'a Book, policy: &'a MatchPolicy) -> Self {
        let page_count = book.page_count();
        let seams: Vec<Seam> = (0..page_count.saturating_sub(1))
            .map(|left| Seam {
                text: book.seam(left, policy.seam_len),
                split: book.page(left).len().min(policy.seam_len),
            })
            .collect();

        let mut index = QGramIndex::new(policy.q);
        for page in 0..page_count {
            index.index(page, book.page(page), false);
        }
        for (left, seam) in seams.iter().enumerate() {
            index.index(left, &seam.text, true);
        }

        log::debug!(
            "q-gram index: q={}, {} distinct grams over {} pages and {} seams",
            policy.q,
            index.gram_count(),
            page_count,
            seams.len()
        );

        Self {
            book,
            seams,
            index,
            policy,
        }
    }

    /// Lowest-distance accepted page; ties go to the earliest page.
    fn best_page(&self, excerpt: &[char]) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None; // (distance, page)

        for candidate in self.candidates(excerpt) {
            let Some(eval) = self.evaluate(excerpt, &candidate) else {
                continue;
            };
            let key = (eval.distance, candidate.page);
            if best.map_or(true, |current| key < current) {
                best = Some(key);
            }
            if eval.distance == 0 {
                break;
            }
        }

        best.map(|(_, page)| page)
    }

    /// Best accepted hit per page.
    fn page_hits(&self, excerpt: &[char]) -> BTreeMap<usize, PageHit> {
        let mut hits: BTreeMap<usize, PageHit> = BTreeMap::new();

        for candidate in self.candidates(excerpt) {
            let Some(eval) = self.evaluate(excerpt, &candidate) else {
                continue;
            };
            let hit = PageHit {
                score: eval.score(),
                exact: false,
                seam: eval.seam,
            };
            hits.entry(candidate.page)
                .and_modify(|current| {
                    if current.is_improved_by(&hit) {
                        *current = hit;
                    }
                })
                .or_insert(hit);
        }

        hits
    }

    /// Deduplicated candidate starts derived from the rarest seed grams.
    fn candidates(&self, excerpt: &[char]) -> Vec<Candidate> {
        let seeds = self.index.pick_seeds(excerpt, self.policy.grams_per_excerpt);
        let cap = self.policy.max_candidates_per_excerpt;

        let mut seen: HashSet<Candidate> = HashSet::new();
        let mut candidates = Vec::new();

        'seeds: for seed in &seeds {
            let Some(postings) = self.index.postings(&seed.gram) else {
                continue;
            };
            for posting in postings {
                let candidate = Candidate {
                    page: posting.page,
                    start: posting.pos.saturating_sub(seed.offset),
                    seam: posting.seam,
                };
                if seen.insert(candidate) {
                    candidates.push(candidate);
                    if candidates.len() >= cap {
                        break 'seeds;
                    }
                }
            }
        }

        log::trace!(
            "{} seeds -> {} candidates for excerpt of {} chars",
            seeds.len(),
            candidates.len(),
            excerpt.len()
        );

        candidates
    }

    /// Bounded edit distance of `excerpt` against the window around a
    /// candidate; `None` when the candidate is rejected.
    fn evaluate(&self, excerpt: &[char], candidate: &Candidate) -> Option<Evaluation> {
        let len = excerpt.len();
        let max_dist = self.policy.max_distance_for(len);
        let extra = max_dist.min(MIN_WINDOW_EXTRA.max((len as f64 * WINDOW_EXTRA_RATIO).ceil() as usize));

        let (variants, crosses_boundary) = self.windows(len, candidate, extra)?;
        let acceptance = if crosses_boundary {
            max_dist.saturating_add(boundary_bonus(max_dist))
        } else {
            max_dist
        };

        let mut distance = acceptance.saturating_add(1);
        for window in &variants {
            distance = distance.min(bounded_substring_distance(excerpt, window, acceptance));
            if distance == 0 {
                break;
            }
        }

        (distance <= acceptance).then_some(Evaluation {
            distance,
            acceptance,
            seam: candidate.seam,
        })
    }

    /// Text windows around a candidate and whether the excerpt spans a page
    /// boundary. `None` when the candidate adds nothing over plain page
    /// candidates.
    ///
    /// In-page windows that run off a page edge borrow at most `seam_len`
    /// chars from the neighbouring page, producing a variant joined with the
    /// book's separator space and one joined without it. Seam candidates
    /// count only when the excerpt span covers the separator; otherwise the
    /// same text is already indexed on one of the two pages.
    fn windows(
        &self,
        len: usize,
        candidate: &Candidate,
        extra: usize,
    ) -> Option<(Vec<Vec<char>>, bool)> {
        let want_end = candidate.start + len + extra;

        if candidate.seam {
            let seam = &self.seams[candidate.page];
            if candidate.start > seam.split || candidate.start + len <= seam.split {
                return None;
            }
            let lo = candidate.start.saturating_sub(extra);
            let hi = want_end.min(seam.text.len());
            return Some((vec![seam.text[lo..hi].to_vec()], true));
        }

        let page = self.book.page(candidate.page);
        let own_lo = candidate.start.saturating_sub(extra).min(page.len());
        let own_hi = want_end.min(page.len());
        let own = &page[own_lo..own_hi.max(own_lo)];

        let need_before = extra.saturating_sub(candidate.start);
        let before: &[char] = if need_before > 0 && candidate.page > 0 {
            let prev = self.book.page(candidate.page - 1);
            let take = need_before.min(self.policy.seam_len).min(prev.len());
            &prev[prev.len() - take..]
        } else {
            &[]
        };

        let need_after = want_end.saturating_sub(page.len());
        let after: &[char] = if need_after > 0 && candidate.page + 1 < self.book.page_count() {
            let next = self.book.page(candidate.page + 1);
            let take = need_after.min(self.policy.seam_len).min(next.len());
            &next[..take]
        } else {
            &[]
        };

        let crosses_boundary =
            candidate.start + len > page.len() && candidate.page + 1 < self.book.page_count();
        if before.is_empty() && after.is_empty() {
            return Some((vec![own.to_vec()], crosses_boundary));
        }

        let mut spaced = Vec::with_capacity(before.len() + own.len() + after.len() + 2);
        let mut tight = Vec::with_capacity(before.len() + own.len() + after.len());
        if !before.is_empty() {
            spaced.extend_from_slice(before);
            spaced.push(' ');
            tight.extend_from_slice(before);
        }
        spaced.extend_from_slice(own);
        tight.extend_from_slice(own);
        if !after.is_empty() {
            spaced.push(' ');
            spaced.extend_from_slice(after);
            tight.extend_from_slice(after);
        }

        Some((vec![spaced, tight], crosses_boundary))
    }
}

/// Extra edit distance tolerated for seam and boundary-spanning windows.
#[inline]
fn boundary_bonus(max_dist: usize) -> usize {
    (max_dist / 4).clamp(1, BOUNDARY_BONUS_CAP)
}

/// Drop redundant seam-derived hits for one excerpt.
///
/// 1. Of two adjacent pages both holding only seam hits, keep the stronger
///    (ties keep the earlier page).
/// 2. A seam hit on page `p` is dropped when page `p + 1` holds an exact hit
///    or a non-seam hit scoring at least as well.
fn prune_seam_hits(hits: &mut BTreeMap<usize, PageHit>) {
    let is_seam_only = |hit: &PageHit| hit.seam && !hit.exact;

    let pages: Vec<usize> = hits.keys().copied().collect();
    for page in pages {
        let (Some(left), Some(right)) = (hits.get(&page).copied(), hits.get(&(page + 1)).copied())
        else {
            continue;
        };
        if is_seam_only(&left) && is_seam_only(&right) {
            if right.score > left.score {
                hits.remove(&page);
            } else {
                hits.remove(&(page + 1));
            }
        }
    }

    let redundant: Vec<usize> = hits
        .iter()
        .filter(|(page, hit)| {
            is_seam_only(hit)
                && hits
                    .get(&(**page + 1))
                    .is_some_and(|next| next.exact || (!next.seam && next.score >= hit.score))
        })
        .map(|(page, _)| *page)
        .collect();
    for page in redundant {
        hits.remove(&page);
    }
}

/// Exact hits by ascending page, then fuzzy hits by descending score.
fn rank_hits(hits: &BTreeMap<usize, PageHit>) -> Vec<PageMatch> {
    let mut ranked: Vec<PageMatch> = hits
        .iter()
        .map(|(&page, hit)| PageMatch {
            page,
            score: hit.score,
            exact: hit.exact,
            seam: hit.seam,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.exact
            .cmp(&a.exact)
            .then_with(|| {
                if a.exact {
                    std::cmp::Ordering::Equal
                } else {
                    b.score.total_cmp(&a.score)
                }
            })
            .then_with(|| a.page.cmp(&b.page))
    });

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_fuzzy() -> MatchPolicy {
        MatchPolicy {
            enable_fuzzy: false,
            ..Default::default()
        }
    }

    fn seam_hit(score: f64) -> PageHit {
        PageHit {
            score,
            exact: false,
            seam: true,
        }
    }

    fn page_hit(score: f64) -> PageHit {
        PageHit {
            score,
            exact: false,
            seam: false,
        }
    }

    #[test]
    fn test_exact_match_single_page() {
        let pages = ["page one text", "page two has target phrase"];
        let result =
            find_best_page_per_excerpt(&pages, &["target phrase"], &MatchPolicy::default()).unwrap();
        assert_eq!(result, vec![Some(1)]);
    }

    #[test]
    fn test_near_miss_without_fuzzy() {
        let pages = ["the quick brown fox jumps over the lazy dog"];
        // two edits away from "quick brown fox"
        let result = find_best_page_per_excerpt(&pages, &["quikc brown fox"], &no_fuzzy()).unwrap();
        assert_eq!(result, vec![None]);
    }

    #[test]
    fn test_near_miss_with_fuzzy() {
        let pages = [
            "nothing relevant lives on this first page at all",
            "the quick brown fox jumps over the lazy dog",
        ];
        let result =
            find_best_page_per_excerpt(&pages, &["quick brwn fox jumps"], &MatchPolicy::default())
                .unwrap();
        assert_eq!(result, vec![Some(1)]);
    }

    #[test]
    fn test_duplicate_excerpts() {
        let pages = ["has x once", "nothing here"];
        let best = find_best_page_per_excerpt(&pages, &["x", "x"], &MatchPolicy::default()).unwrap();
        assert_eq!(best, vec![Some(0), Some(0)]);

        let all = find_all_pages_per_excerpt(&pages, &["x", "x"], &MatchPolicy::default()).unwrap();
        assert_eq!(all, vec![vec![0], vec![0]]);
    }

    #[test]
    fn test_first_exact_occurrence_wins() {
        let pages = ["alpha", "target here", "target again"];
        let best = find_best_page_per_excerpt(&pages, &["target"], &no_fuzzy()).unwrap();
        assert_eq!(best, vec![Some(1)]);

        let all = find_all_pages_per_excerpt(&pages, &["target"], &no_fuzzy()).unwrap();
        assert_eq!(all, vec![vec![1, 2]]);
    }

    #[test]
    fn test_exact_match_is_normalized() {
        let pages = ["قال رسولُ اللهِ صلى الله عليه وسلم", "باب آخر"];
        let best = find_best_page_per_excerpt(&pages, &["رَسُولُ الله"], &no_fuzzy()).unwrap();
        assert_eq!(best, vec![Some(0)]);
    }

    #[test]
    fn test_empty_excerpt_matches_nowhere() {
        let pages = ["some text"];
        let best = find_best_page_per_excerpt(&pages, &["", "   "], &MatchPolicy::default()).unwrap();
        assert_eq!(best, vec![None, None]);
        let all = find_all_pages_per_excerpt(&pages, &[""], &MatchPolicy::default()).unwrap();
        assert_eq!(all, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_invalid_policy_fails_fast() {
        let policy = MatchPolicy {
            q: 0,
            ..Default::default()
        };
        assert!(find_best_page_per_excerpt(&["a"], &["a"], &policy).is_err());
        assert!(find_all_pages_per_excerpt(&["a"], &["a"], &policy).is_err());
    }

    #[test]
    fn test_fuzzy_tie_goes_to_earliest_page() {
        let pages = [
            "filler words before the quick brown fox jumps",
            "filler words before the quick brown fox jumps",
        ];
        let best =
            find_best_page_per_excerpt(&pages, &["quick brwn fox jumps"], &MatchPolicy::default())
                .unwrap();
        assert_eq!(best, vec![Some(0)]);
    }

    #[test]
    fn test_fuzzy_across_page_boundary() {
        let pages = [
            "the opening words of the first page end with quick brown",
            "fox jumps over the lazy dog and the page continues",
        ];
        // the missing space keeps the exact pass from firing
        let excerpt = ["quick brownfox jumps over"];
        let best = find_best_page_per_excerpt(&pages, &excerpt, &no_fuzzy()).unwrap();
        assert_eq!(best, vec![None]);

        let best = find_best_page_per_excerpt(&pages, &excerpt, &MatchPolicy::default()).unwrap();
        assert_eq!(best, vec![Some(0)]);
    }

    #[test]
    fn test_all_matches_ranking() {
        let pages = [
            "the quick brown fox jumps over the lazy dog",
            "a quick brown fax jumps over a fence",
            "unrelated content only",
        ];
        let matches =
            find_all_matches_per_excerpt(&pages, &["quick brown fox jumps"], &MatchPolicy::default())
                .unwrap();
        // exact on page 0 stops the fuzzy pass entirely
        assert_eq!(matches[0].len(), 1);
        assert!(matches[0][0].exact);
        assert_eq!(matches[0][0].page, 0);

        let matches =
            find_all_matches_per_excerpt(&pages, &["quick brown fix jumps"], &MatchPolicy::default())
                .unwrap();
        let ranked: Vec<usize> = matches[0].iter().map(|m| m.page).collect();
        assert_eq!(ranked, vec![0, 1]);
        assert!(matches[0].iter().all(|m| !m.exact));
        assert!(matches[0][0].score >= matches[0][1].score);
    }

    #[test]
    fn test_seam_candidate_wins_and_counts_for_left_page() {
        let pages = ["alpha beta gamma", "delta epsilon zeta"];
        // "mma " only occurs in the boundary buffer, so it is the rarest gram
        let policy = MatchPolicy {
            grams_per_excerpt: 1,
            ..Default::default()
        };
        let matches = find_all_matches_per_excerpt(&pages, &["gamma dalta"], &policy).unwrap();
        assert_eq!(matches[0].len(), 1);
        let hit = matches[0][0];
        assert_eq!(hit.page, 0);
        assert!(hit.seam);
        assert!(!hit.exact);
        // distance 1 against the relaxed acceptance of 3 + 1
        assert!((hit.score - 0.75).abs() < 1e-9);

        let best = find_best_page_per_excerpt(&pages, &["gamma dalta"], &policy).unwrap();
        assert_eq!(best, vec![Some(0)]);

        // With more seeds the in-page window on page 0 ties and replaces it
        let matches =
            find_all_matches_per_excerpt(&pages, &["gamma dalta"], &MatchPolicy::default()).unwrap();
        assert_eq!(matches[0].len(), 1);
        assert_eq!(matches[0][0].page, 0);
        assert!(!matches[0][0].seam);
    }

    #[test]
    fn test_seam_candidate_must_cover_separator() {
        let pages = ["alpha beta gamma", "delta epsilon zeta"];
        // The seam buffer also holds this text, but past the separator
        let all =
            find_all_pages_per_excerpt(&pages, &["epsilon zetta"], &MatchPolicy::default()).unwrap();
        assert_eq!(all, vec![vec![1]]);
    }

    #[test]
    fn test_adjacent_seam_hits_collapse_to_earlier_page() {
        let pages = ["xx gamma", "delta yy gamma", "delta zz"];
        let policy = MatchPolicy {
            grams_per_excerpt: 1,
            ..Default::default()
        };
        // Both boundaries hold "gamma delta" at distance 1
        let matches = find_all_matches_per_excerpt(&pages, &["gamma dalta"], &policy).unwrap();
        let found: Vec<(usize, bool)> = matches[0].iter().map(|m| (m.page, m.seam)).collect();
        assert_eq!(found, vec![(0, true)]);
    }

    #[test]
    fn test_candidate_cap_limits_pages_found() {
        let pages = [
            "the quick brown fox jumps over the lazy dog",
            "a quick brown fax jumps over a fence",
        ];
        let excerpt = ["quick brown fix jumps"];
        let all = find_all_pages_per_excerpt(&pages, &excerpt, &MatchPolicy::default()).unwrap();
        assert_eq!(all, vec![vec![0, 1]]);

        // Only the first posting of the first seed survives the cap
        let capped = MatchPolicy {
            max_candidates_per_excerpt: 1,
            ..Default::default()
        };
        let all = find_all_pages_per_excerpt(&pages, &excerpt, &capped).unwrap();
        assert_eq!(all, vec![vec![0]]);
    }

    #[test]
    fn test_oversized_edit_ceiling() {
        let policy = MatchPolicy {
            max_edit_abs: usize::MAX,
            ..Default::default()
        };
        assert!(find_best_page_per_excerpt(&["a"], &["a"], &policy).is_err());
        assert!(find_all_matches_per_excerpt(&["a"], &["a"], &policy).is_err());

        // The largest accepted ceiling runs without overflow
        let policy = MatchPolicy {
            max_edit_abs: crate::models::MAX_EDIT_ABS_LIMIT,
            ..Default::default()
        };
        let best = find_best_page_per_excerpt(&["the quick brown fox"], &["quick brwn"], &policy).unwrap();
        assert_eq!(best, vec![Some(0)]);
    }

    #[test]
    fn test_prune_adjacent_seam_hits() {
        let mut hits = BTreeMap::from([(3, seam_hit(0.5)), (4, seam_hit(0.8))]);
        prune_seam_hits(&mut hits);
        assert_eq!(hits.keys().copied().collect::<Vec<_>>(), vec![4]);

        // tie drops the later page
        let mut hits = BTreeMap::from([(3, seam_hit(0.5)), (4, seam_hit(0.5))]);
        prune_seam_hits(&mut hits);
        assert_eq!(hits.keys().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_prune_seam_hit_covered_by_next_page() {
        let mut hits = BTreeMap::from([(1, seam_hit(0.6)), (2, page_hit(0.6))]);
        prune_seam_hits(&mut hits);
        assert_eq!(hits.keys().copied().collect::<Vec<_>>(), vec![2]);

        // a weaker non-seam hit on the next page does not cover the seam hit
        let mut hits = BTreeMap::from([(1, seam_hit(0.9)), (2, page_hit(0.4))]);
        prune_seam_hits(&mut hits);
        assert_eq!(hits.keys().copied().collect::<Vec<_>>(), vec![1, 2]);

        let mut hits = BTreeMap::from([(1, seam_hit(0.9)), (2, PageHit::exact())]);
        prune_seam_hits(&mut hits);
        assert_eq!(hits.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_rank_hits_order() {
        let hits = BTreeMap::from([
            (0, page_hit(0.4)),
            (2, PageHit::exact()),
            (5, page_hit(0.9)),
            (6, PageHit::exact()),
            (7, page_hit(0.9)),
        ]);
        let ranked: Vec<usize> = rank_hits(&hits).iter().map(|m| m.page).collect();
        assert_eq!(ranked, vec![2, 6, 5, 7, 0]);
    }

    #[test]
    fn test_boundary_bonus_is_small_and_capped() {
        assert_eq!(boundary_bonus(0), 1);
        assert_eq!(boundary_bonus(3), 1);
        assert_eq!(boundary_bonus(8), 2);
        assert_eq!(boundary_bonus(100), 2);
    }
}
