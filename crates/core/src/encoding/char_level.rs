//! Character-level BPE merge application.
//!
//! Words are split into Unicode code points (the first one carrying the
//! word-start marker) and merged according to a [`MergeRules`] table: the
//! adjacent pair with the lowest rank is merged first, the leftmost one when
//! several occurrences share that rank, and the word is re-examined after
//! every merge until no adjacent pair has a rule.

use crate::core::merges::{MergeRules, Pair};
use crate::core::pieces::{word_pieces, PieceId};
use compact_str::CompactString;
use dary_heap::OctonaryHeap;
use std::cmp::Ordering;
use std::sync::Arc;

/// A pending merge of the pieces starting at `pos`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MergeOp {
    rank: u32,
    pos: usize,
    pair: Pair,
    merged: PieceId,
}

// Max-heap ordering: lowest rank first, then leftmost position.
impl Ord for MergeOp {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .rank
            .cmp(&self.rank)
            .then_with(|| other.pos.cmp(&self.pos))
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

impl PartialOrd for MergeOp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Character-level BPE encoder.
///
/// Owns a shared handle to the merge table; cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct CharLevelEncoder {
    merges: Arc<MergeRules>,
}

impl CharLevelEncoder {
    /// Create a new encoder over a merge table.
    pub fn new(merges: Arc<MergeRules>) -> Self {
        Self { merges }
    }

    /// The merge table this encoder applies.
    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    /// Split `word` into pieces and apply every applicable merge.
    pub fn apply_merges(&self, word: &str) -> Vec<CompactString> {
        let pieces = word_pieces(word);
        if pieces.len() < 2 || self.merges.is_empty() {
            return pieces;
        }

        let table = self.merges.pieces();
        let n = pieces.len();

        // Pieces the table has never seen cannot take part in any rule.
        let mut symbols: Vec<Option<PieceId>> = pieces.iter().map(|p| table.get(p)).collect();
        let mut merged = vec![false; n];
        let mut alive = vec![true; n];
        // Linked list over positions; `n` marks the end.
        let mut next: Vec<usize> = (1..=n).collect();
        let mut prev: Vec<Option<usize>> = (0..n).map(|i| i.checked_sub(1)).collect();

        let mut heap = OctonaryHeap::with_capacity(n);
        for pos in 0..n - 1 {
            self.push_candidate(&mut heap, &symbols, pos, pos + 1);
        }

        while let Some(op) = heap.pop() {
            let left = op.pos;
            if !alive[left] {
                continue;
            }
            let right = next[left];
            if right >= n {
                continue;
            }
            // Stale entry: one side changed since it was queued.
            if symbols[left] != Some(op.pair.0) || symbols[right] != Some(op.pair.1) {
                continue;
            }

            symbols[left] = Some(op.merged);
            merged[left] = true;
            alive[right] = false;

            let after = next[right];
            next[left] = after;
            if after < n {
                prev[after] = Some(left);
            }

            if let Some(before) = prev[left] {
                self.push_candidate(&mut heap, &symbols, before, left);
            }
            if after < n {
                self.push_candidate(&mut heap, &symbols, left, after);
            }
        }

        let mut out = Vec::with_capacity(n);
        let mut pos = 0;
        for (i, piece) in pieces.into_iter().enumerate() {
            if i != pos {
                continue;
            }
            match symbols[i] {
                Some(id) if merged[i] => out.push(CompactString::new(table.resolve(id))),
                _ => out.push(piece),
            }
            pos = next[i];
        }
        out
    }

    fn push_candidate(
        &self,
        heap: &mut OctonaryHeap<MergeOp>,
        symbols: &[Option<PieceId>],
        left: usize,
        right: usize,
    ) {
        let (Some(l), Some(r)) = (symbols[left], symbols[right]) else {
            return;
        };
        if let Some((rank, merged)) = self.merges.get((l, r)) {
            heap.push(MergeOp {
                rank,
                pos: left,
                pair: (l, r),
                merged,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder_with(pairs: &[(&str, &str)]) -> CharLevelEncoder {
        CharLevelEncoder::new(Arc::new(MergeRules::from_pairs(pairs.iter().copied())))
    }

    #[test]
    fn test_no_merges() {
        let encoder = encoder_with(&[]);
        assert_eq!(encoder.apply_merges("low"), vec!["▁l", "o", "w"]);
        assert!(encoder.apply_merges("").is_empty());
    }

    #[test]
    fn test_priority_respected() {
        // (b, c) would apply first by position, but (▁a, b) has the lower rank.
        let encoder = encoder_with(&[("▁a", "b"), ("b", "c")]);
        assert_eq!(encoder.apply_merges("abc"), vec!["▁ab", "c"]);

        let encoder = encoder_with(&[("b", "c"), ("▁a", "b")]);
        assert_eq!(encoder.apply_merges("abc"), vec!["▁a", "bc"]);
    }

    #[test]
    fn test_leftmost_wins_on_equal_rank() {
        let encoder = encoder_with(&[("a", "a")]);
        assert_eq!(encoder.apply_merges("xaaa"), vec!["▁x", "aa", "a"]);
    }

    #[test]
    fn test_merged_pieces_merge_again() {
        let encoder = encoder_with(&[("▁l", "o"), ("▁lo", "w"), ("e", "r"), ("▁low", "er")]);
        assert_eq!(encoder.apply_merges("lower"), vec!["▁lower"]);
        assert_eq!(encoder.apply_merges("lowest"), vec!["▁low", "e", "s", "t"]);
    }

    #[test]
    fn test_unknown_code_points_pass_through() {
        let encoder = encoder_with(&[("▁l", "o")]);
        assert_eq!(encoder.apply_merges("lož"), vec!["▁lo", "ž"]);
        assert_eq!(encoder.apply_merges("žlo"), vec!["▁ž", "l", "o"]);
    }

    #[test]
    fn test_later_rule_enabled_by_earlier_merge() {
        // "ab" only exists after rank 0 fires; rank 1 then applies to it.
        let encoder = encoder_with(&[("a", "b"), ("ab", "c"), ("▁x", "abc")]);
        assert_eq!(encoder.apply_merges("xabc"), vec!["▁xabc"]);
    }
}
