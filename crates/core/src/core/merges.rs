//! Merge rule management for BPE.
//!
//! Merge rules are stored using piece handles rather than strings for fast
//! comparison. The rank of a rule is its position in training order; a lower
//! rank means higher priority at encode time.

use super::pieces::{PieceId, PieceTable};
use ahash::AHashMap;
use compact_str::CompactString;

/// A pair of adjacent piece handles that can be merged.
pub type Pair = (PieceId, PieceId);

/// Merge rule mapping: pair -> (rank, merged_piece).
pub type MergeMap = AHashMap<Pair, (u32, PieceId)>;

/// Ordered collection of BPE merge rules with handle-keyed lookup.
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    /// Interned left, right and merged pieces
    pieces: PieceTable,
    /// Merge rules: pair -> (rank, merged_piece)
    merges: MergeMap,
    /// Rules in rank order
    ordered: Vec<Pair>,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create merge rules from string pairs, ranked in iteration order.
    pub fn from_pairs<L, R>(pairs: impl IntoIterator<Item = (L, R)>) -> Self
    where
        L: AsRef<str>,
        R: AsRef<str>,
    {
        let mut rules = Self::new();
        for (left, right) in pairs {
            rules.push(left.as_ref(), right.as_ref());
        }
        rules
    }

    /// The piece table backing this rule set.
    #[inline]
    pub fn pieces(&self) -> &PieceTable {
        &self.pieces
    }

    /// Intern a piece so it can appear in pairs passed to [`Self::add_merge`].
    pub fn intern(&mut self, piece: &str) -> PieceId {
        self.pieces.intern(piece)
    }

    /// Append a rule for two interned pieces at the next rank.
    ///
    /// Returns the rule's `(rank, merged_piece)`. The same pair appended
    /// again is recorded in the ordered list, but lookups keep the rank of
    /// its first appearance.
    pub fn add_merge(&mut self, pair: Pair) -> (u32, PieceId) {
        let rank = self.ordered.len() as u32;
        self.ordered.push(pair);

        if let Some(&existing) = self.merges.get(&pair) {
            return existing;
        }

        let mut merged = CompactString::new(self.pieces.resolve(pair.0));
        merged.push_str(self.pieces.resolve(pair.1));
        let merged = self.pieces.intern(&merged);

        self.merges.insert(pair, (rank, merged));
        (rank, merged)
    }

    /// Append a rule given as strings, returning its rank.
    pub fn push(&mut self, left: &str, right: &str) -> u32 {
        let pair = (self.pieces.intern(left), self.pieces.intern(right));
        let rank = self.ordered.len() as u32;
        self.add_merge(pair);
        rank
    }

    /// Get the merge rule for a pair.
    ///
    /// Returns `Some((rank, merged_piece))` if this pair should be merged.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<(u32, PieceId)> {
        self.merges.get(&pair).copied()
    }

    /// Rank of the rule merging `left` and `right`, if any.
    pub fn rank_of(&self, left: &str, right: &str) -> Option<u32> {
        let pair = (self.pieces.get(left)?, self.pieces.get(right)?);
        self.get(pair).map(|(rank, _)| rank)
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Rules as `(left, right)` strings in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.ordered
            .iter()
            .map(|&(left, right)| (self.pieces.resolve(left), self.pieces.resolve(right)))
    }
}

impl PartialEq for MergeRules {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for MergeRules {}
