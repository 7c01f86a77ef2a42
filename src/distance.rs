//! Levenshtein edit distance: full, banded with an early-exit ceiling, and
//! substring (free start/end in the text) variants.
//!
//! This is the HOT PATH for fuzzy matching - every candidate window goes
//! through `bounded_levenshtein_chars` or `bounded_substring_distance`.
//!
//! All distances are over Unicode scalar values (`char`), not bytes.

/// Full Levenshtein distance between two strings.
#[inline]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

/// Full Levenshtein distance using a single rolling row sized to the
/// shorter input.
pub fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    // Keep the row over the shorter sequence
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }

    let mut row: Vec<usize> = (0..=short.len()).collect();

    for (i, &lc) in long.iter().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, &sc) in short.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(lc != sc);
            row[j + 1] = (diag + cost).min(above + 1).min(row[j] + 1);
            diag = above;
        }
    }

    row[short.len()]
}

/// Levenshtein distance with a ceiling. Returns `max_dist + 1` whenever the
/// true distance exceeds `max_dist`.
#[inline]
pub fn bounded_levenshtein(a: &str, b: &str, max_dist: usize) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    bounded_levenshtein_chars(&a, &b, max_dist)
}

/// Banded Levenshtein over char slices.
///
/// Only the diagonal band `[i - max_dist, i + max_dist]` of each row is
/// computed; everything outside it reads as `max_dist + 1`. The scan stops
/// as soon as a whole row exceeds the ceiling.
pub fn bounded_levenshtein_chars(a: &[char], b: &[char], max_dist: usize) -> usize {
    let sentinel = max_dist.saturating_add(1);
    let n = a.len();
    let m = b.len();

    // Length difference is a lower bound on edit distance
    if n.abs_diff(m) > max_dist {
        return sentinel;
    }
    if n == 0 || m == 0 {
        // The other side is within the bound, checked above
        return n.max(m);
    }

    let mut prev: Vec<usize> = (0..=m)
        .map(|j| if j <= max_dist { j } else { sentinel })
        .collect();
    let mut curr = vec![sentinel; m + 1];

    for i in 1..=n {
        let lo = if i > max_dist { i - max_dist } else { 1 };
        let hi = i.saturating_add(max_dist).min(m);

        // Left neighbour of the band: column 0 or an out-of-band cell
        curr[lo - 1] = if lo == 1 { i.min(sentinel) } else { sentinel };
        let mut row_min = curr[lo - 1];

        let ca = a[i - 1];
        for j in lo..=hi {
            let cost = usize::from(ca != b[j - 1]);
            let value = prev[j - 1]
                .saturating_add(cost)
                .min(prev[j].saturating_add(1))
                .min(curr[j - 1].saturating_add(1))
                .min(sentinel);
            curr[j] = value;
            row_min = row_min.min(value);
        }

        if row_min > max_dist {
            return sentinel;
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    let result = prev[m];
    if result <= max_dist {
        result
    } else {
        sentinel
    }
}

/// Smallest edit distance between `pattern` and any substring of `text`,
/// capped at `max_dist + 1`.
///
/// Used for candidate windows, where the excerpt may start or end anywhere
/// inside the window.
pub fn bounded_substring_distance(pattern: &[char], text: &[char], max_dist: usize) -> usize {
    let sentinel = max_dist.saturating_add(1);
    let n = pattern.len();
    let m = text.len();

    if n == 0 {
        return 0;
    }
    if n > m.saturating_add(max_dist) {
        return sentinel;
    }
    if m == 0 {
        return n.min(sentinel);
    }

    // Row 0 is all zeros: the match may start at any text position
    let mut prev = vec![0usize; m + 1];
    let mut curr = vec![0usize; m + 1];

    for i in 1..=n {
        curr[0] = i.min(sentinel);
        let mut row_min = curr[0];
        let pc = pattern[i - 1];

        for j in 1..=m {
            let cost = usize::from(pc != text[j - 1]);
            let value = prev[j - 1]
                .saturating_add(cost)
                .min(prev[j].saturating_add(1))
                .min(curr[j - 1].saturating_add(1))
                .min(sentinel);
            curr[j] = value;
            row_min = row_min.min(value);
        }

        if row_min > max_dist {
            return sentinel;
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    // The match may end at any text position
    let best = prev.iter().copied().min().unwrap_or(sentinel);
    if best <= max_dist {
        best
    } else {
        sentinel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small deterministic generator for property checks.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }

        fn string(&mut self, alphabet: &[char], max_len: usize) -> String {
            let len = (self.next() as usize) % (max_len + 1);
            (0..len)
                .map(|_| alphabet[(self.next() as usize) % alphabet.len()])
                .collect()
        }
    }

    const ALPHABET: [char; 5] = ['a', 'b', 'c', 'ب', 'ت'];

    #[test]
    fn test_classic_pairs() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", ""), 0);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // Each Arabic letter is two bytes in UTF-8
        assert_eq!(levenshtein("كتب", "كتاب"), 1);
        assert_eq!(bounded_levenshtein("كتب", "كتاب", 1), 1);
    }

    #[test]
    fn test_bounded_returns_sentinel() {
        assert_eq!(bounded_levenshtein("kitten", "sitting", 2), 3);
        assert_eq!(bounded_levenshtein("kitten", "sitting", 3), 3);
        assert_eq!(bounded_levenshtein("kitten", "sitting", 10), 3);
    }

    #[test]
    fn test_bounded_length_gap_exit() {
        assert_eq!(bounded_levenshtein("a", "abcdef", 2), 3);
        assert_eq!(bounded_levenshtein("", "ab", 2), 2);
        assert_eq!(bounded_levenshtein("", "abc", 2), 3);
    }

    #[test]
    fn test_bounded_zero_ceiling() {
        assert_eq!(bounded_levenshtein("same", "same", 0), 0);
        assert_eq!(bounded_levenshtein("same", "sane", 0), 1);
    }

    #[test]
    fn test_ceiling_at_usize_max() {
        assert_eq!(bounded_levenshtein("kitten", "sitting", usize::MAX), 3);
        let pattern: Vec<char> = "wrld".chars().collect();
        let text: Vec<char> = "hello world".chars().collect();
        assert_eq!(bounded_substring_distance(&pattern, &text, usize::MAX), 1);
    }

    #[test]
    fn test_symmetry_and_identity() {
        let mut rng = Lcg(7);
        for _ in 0..300 {
            let a = rng.string(&ALPHABET, 9);
            let b = rng.string(&ALPHABET, 9);
            assert_eq!(levenshtein(&a, &b), levenshtein(&b, &a), "{a:?} {b:?}");
            assert_eq!(levenshtein(&a, &a), 0);
            for k in 0..4 {
                assert_eq!(bounded_levenshtein(&a, &a, k), 0);
            }
        }
    }

    #[test]
    fn test_bounded_agrees_with_full() {
        let mut rng = Lcg(42);
        for _ in 0..500 {
            let a = rng.string(&ALPHABET, 10);
            let b = rng.string(&ALPHABET, 10);
            let full = levenshtein(&a, &b);
            for k in 0..8 {
                assert_eq!(
                    bounded_levenshtein(&a, &b, k),
                    full.min(k + 1),
                    "a={a:?} b={b:?} k={k}"
                );
            }
        }
    }

    #[test]
    fn test_substring_distance() {
        let text: Vec<char> = "xx hello world yy".chars().collect();
        let exact: Vec<char> = "hello".chars().collect();
        let typo: Vec<char> = "helo world".chars().collect();
        let absent: Vec<char> = "zzzzzz".chars().collect();

        assert_eq!(bounded_substring_distance(&exact, &text, 2), 0);
        assert_eq!(bounded_substring_distance(&typo, &text, 2), 1);
        assert_eq!(bounded_substring_distance(&absent, &text, 2), 3);
        assert_eq!(bounded_substring_distance(&[], &text, 2), 0);
    }

    #[test]
    fn test_substring_never_exceeds_full() {
        let mut rng = Lcg(99);
        for _ in 0..300 {
            let p: Vec<char> = rng.string(&ALPHABET, 6).chars().collect();
            let t: Vec<char> = rng.string(&ALPHABET, 10).chars().collect();
            let full = levenshtein_chars(&p, &t);
            assert!(bounded_substring_distance(&p, &t, 10) <= full);
        }
    }
}
