//! Core BPE data structures.
//!
//! This module contains the vocabulary, the piece interner and the merge
//! table, independent of how text is normalized or split.

pub mod merges;
pub mod pieces;
pub mod vocab;

pub use merges::{MergeMap, MergeRules, Pair};
pub use pieces::{strip_word_start, word_pieces, PieceId, PieceTable, WORD_START};
pub use vocab::{SpecialTokens, Vocab, VocabR, Vocabulary};
