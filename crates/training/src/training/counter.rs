//! Pair counting for BPE training.
//!
//! [`PairCounter`] holds the distinct words of a corpus as piece-handle
//! sequences together with their frequencies. Every training iteration asks
//! it for a fresh [`PairTable`]; nothing carries over between iterations.

use ahash::AHashMap;
use rayon::prelude::*;
use std::cmp::Ordering;
use tokenmill_core::{word_pieces, MergeRules, Pair, PieceId};

/// Where a pair was first seen during a corpus scan: `(word index, offset)`.
///
/// Words are indexed in first-appearance order, so comparing positions
/// orders pairs by when the scan first encountered them.
pub type ScanPosition = (usize, usize);

/// A merge candidate during BPE training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of piece handles to merge
    pub pair: Pair,
    /// Aggregate frequency of this pair
    pub count: u64,
    /// First occurrence of this pair in the corpus scan
    pub first_seen: ScanPosition,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, count: u64, first_seen: ScanPosition) -> Self {
        Self {
            pair,
            count,
            first_seen,
        }
    }
}

// Higher count wins; on equal counts the pair seen first in the scan wins.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.first_seen.cmp(&self.first_seen))
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Aggregated adjacent-pair frequencies for one training iteration.
#[derive(Debug, Clone, Default)]
pub struct PairTable {
    counts: AHashMap<Pair, (u64, ScanPosition)>,
}

impl PairTable {
    /// Record `count` occurrences of `pair` seen at `position`.
    pub fn add(&mut self, pair: Pair, count: u64, position: ScanPosition) {
        let entry = self.counts.entry(pair).or_insert((0, position));
        entry.0 += count;
        entry.1 = entry.1.min(position);
    }

    /// Combine two partial tables: counts add, first-seen positions take the minimum.
    pub fn merge(mut self, other: PairTable) -> PairTable {
        if self.counts.len() < other.counts.len() {
            return other.merge(self);
        }
        for (pair, (count, position)) in other.counts {
            self.add(pair, count, position);
        }
        self
    }

    /// Aggregate count of a pair.
    pub fn get(&self, pair: Pair) -> Option<u64> {
        self.counts.get(&pair).map(|&(count, _)| count)
    }

    /// The candidate with the highest count, earliest-seen on ties.
    pub fn best(&self) -> Option<MergeCandidate> {
        self.candidates().max()
    }

    /// All pairs as merge candidates, in no particular order.
    pub fn candidates(&self) -> impl Iterator<Item = MergeCandidate> + '_ {
        self.counts
            .iter()
            .map(|(&pair, &(count, first_seen))| MergeCandidate::new(pair, count, first_seen))
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if no pairs were counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Counter for BPE pair frequencies.
#[derive(Debug, Default)]
pub struct PairCounter {
    /// Distinct words as piece handles, in first-appearance order
    words: Vec<Vec<PieceId>>,
    /// Frequency of each word
    word_counts: Vec<u64>,
    /// Word string -> index into `words`
    index: AHashMap<String, usize>,
}

impl PairCounter {
    /// Create a new pair counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add text to be processed for pair counting.
    ///
    /// The text is split into lines and each line into whitespace-delimited
    /// words; empty words never occur.
    pub fn add_text(&mut self, text: &str, merges: &mut MergeRules) {
        for word in text.lines().flat_map(str::split_whitespace) {
            self.add_word(word, merges);
        }
    }

    /// Add a single word to the counter, interning its pieces in `merges`.
    pub fn add_word(&mut self, word: &str, merges: &mut MergeRules) {
        if word.is_empty() {
            return;
        }

        if let Some(&pos) = self.index.get(word) {
            self.word_counts[pos] += 1;
            return;
        }

        let pieces = word_pieces(word)
            .iter()
            .map(|piece| merges.intern(piece))
            .collect();
        self.index.insert(word.to_string(), self.words.len());
        self.words.push(pieces);
        self.word_counts.push(1);
    }

    /// Count pairs, sequentially or as a rayon map-reduce.
    ///
    /// Words occurring fewer than `min_frequency` times are skipped.
    pub fn count_pairs(&self, min_frequency: u64, parallel: bool) -> PairTable {
        if parallel {
            self.count_pairs_parallel(min_frequency)
        } else {
            self.count_pairs_sequential(min_frequency)
        }
    }

    /// Count all pairs in parallel.
    ///
    /// Produces the same table as [`Self::count_pairs_sequential`].
    pub fn count_pairs_parallel(&self, min_frequency: u64) -> PairTable {
        self.words
            .par_iter()
            .zip(self.word_counts.par_iter())
            .enumerate()
            .filter(|(_, (_, count))| **count >= min_frequency)
            .fold(PairTable::default, |mut table, (word_idx, (word, &count))| {
                Self::count_word(&mut table, word_idx, word, count);
                table
            })
            .reduce(PairTable::default, PairTable::merge)
    }

    /// Count all pairs sequentially.
    pub fn count_pairs_sequential(&self, min_frequency: u64) -> PairTable {
        let mut table = PairTable::default();

        for (word_idx, (word, &count)) in self.words.iter().zip(&self.word_counts).enumerate() {
            if count >= min_frequency {
                Self::count_word(&mut table, word_idx, word, count);
            }
        }

        table
    }

    fn count_word(table: &mut PairTable, word_idx: usize, word: &[PieceId], count: u64) {
        for (offset, window) in word.windows(2).enumerate() {
            table.add((window[0], window[1]), count, (word_idx, offset));
        }
    }

    /// Merge a pair in all words, returning how many occurrences were replaced.
    ///
    /// Occurrences are replaced left to right without overlap; a piece
    /// created by this pass is not examined again in the same pass.
    pub fn merge_pair_in_words(&mut self, pair: Pair, merged: PieceId, parallel: bool) -> usize {
        if parallel {
            self.words
                .par_iter_mut()
                .map(|word| Self::merge_word(word, pair, merged))
                .sum()
        } else {
            self.words
                .iter_mut()
                .map(|word| Self::merge_word(word, pair, merged))
                .sum()
        }
    }

    fn merge_word(word: &mut Vec<PieceId>, pair: Pair, merged: PieceId) -> usize {
        if word.len() < 2 {
            return 0;
        }

        let mut replaced = 0;
        let mut out = Vec::with_capacity(word.len());
        let mut i = 0;

        while i < word.len() {
            if i + 1 < word.len() && word[i] == pair.0 && word[i + 1] == pair.1 {
                out.push(merged);
                replaced += 1;
                i += 2;
            } else {
                out.push(word[i]);
                i += 1;
            }
        }

        if replaced > 0 {
            *word = out;
        }
        replaced
    }

    /// Get the number of unique words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Get the total count of all word occurrences.
    pub fn total_word_occurrences(&self) -> u64 {
        self.word_counts.iter().sum()
    }

    /// Get a reference to the words.
    pub fn words(&self) -> &[Vec<PieceId>] {
        &self.words
    }

    /// Get a reference to the word counts.
    pub fn word_counts(&self) -> &[u64] {
        &self.word_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(merges: &MergeRules, left: &str, right: &str) -> Pair {
        let pieces = merges.pieces();
        (pieces.get(left).unwrap(), pieces.get(right).unwrap())
    }

    #[test]
    fn test_add_word() {
        let mut merges = MergeRules::new();
        let mut counter = PairCounter::new();
        counter.add_word("abc", &mut merges);
        counter.add_word("abc", &mut merges);

        assert_eq!(counter.word_count(), 1);
        assert_eq!(counter.word_counts(), &[2]);
        assert_eq!(counter.words()[0].len(), 3);
        assert_eq!(merges.pieces().resolve(counter.words()[0][0]), "▁a");
    }

    #[test]
    fn test_add_text_splits_lines_and_whitespace() {
        let mut merges = MergeRules::new();
        let mut counter = PairCounter::new();
        counter.add_text("ab  cd\n\tab\n\n", &mut merges);

        assert_eq!(counter.word_count(), 2);
        assert_eq!(counter.total_word_occurrences(), 3);
    }

    #[test]
    fn test_count_pairs_with_frequency() {
        let mut merges = MergeRules::new();
        let mut counter = PairCounter::new();
        counter.add_text("ab ab ab cb", &mut merges);

        let table = counter.count_pairs_sequential(1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(pair(&merges, "▁a", "b")), Some(3));
        assert_eq!(table.get(pair(&merges, "▁c", "b")), Some(1));
    }

    #[test]
    fn test_min_frequency_excludes_rare_words() {
        let mut merges = MergeRules::new();
        let mut counter = PairCounter::new();
        counter.add_text("ab ab cd", &mut merges);

        let table = counter.count_pairs_sequential(2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(pair(&merges, "▁c", "d")), None);
    }

    #[test]
    fn test_best_breaks_ties_by_first_seen() {
        let mut merges = MergeRules::new();
        let mut counter = PairCounter::new();
        counter.add_text("xy ab xy ab", &mut merges);

        let best = counter.count_pairs_sequential(1).best().unwrap();
        assert_eq!(best.pair, pair(&merges, "▁x", "y"));
        assert_eq!(best.count, 2);
        assert_eq!(best.first_seen, (0, 0));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut merges = MergeRules::new();
        let mut counter = PairCounter::new();
        counter.add_text(
            "the quick brown fox jumps over the lazy dog the end",
            &mut merges,
        );

        let sequential = counter.count_pairs_sequential(1);
        let parallel = counter.count_pairs_parallel(1);

        assert_eq!(sequential.len(), parallel.len());
        for candidate in sequential.candidates() {
            assert_eq!(parallel.get(candidate.pair), Some(candidate.count));
        }
        assert_eq!(sequential.best(), parallel.best());
    }

    #[test]
    fn test_merge_pair_in_words() {
        let mut merges = MergeRules::new();
        let mut counter = PairCounter::new();
        counter.add_text("baaa aa", &mut merges);

        let target = pair(&merges, "a", "a");
        let (_, merged) = merges.add_merge(target);
        let replaced = counter.merge_pair_in_words(target, merged, false);

        // "▁b a a a" -> "▁b aa a"; "▁a a" has no (a, a) pair.
        assert_eq!(replaced, 1);
        let word: Vec<&str> = counter.words()[0]
            .iter()
            .map(|&p| merges.pieces().resolve(p))
            .collect();
        assert_eq!(word, vec!["▁b", "aa", "a"]);
    }

    #[test]
    fn test_candidate_ordering() {
        let high = MergeCandidate::new((0, 1), 5, (3, 0));
        let low = MergeCandidate::new((1, 2), 4, (0, 0));
        let early = MergeCandidate::new((2, 3), 5, (1, 2));

        assert!(high > low);
        assert!(early > high);
    }
}
