//! tokenmill-core - Core BPE data structures
//!
//! This crate provides the vocabulary store, the ranked merge table and the
//! per-word merge application shared by training and encoding.
//!
//! # Features
//!
//! - Bijective token/id vocabulary with special tokens holding the lowest ids
//! - Merge rules keyed by interned piece handles, ranked in training order
//! - Greedy lowest-rank, leftmost merge application over Unicode code points
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tokenmill_core::{CharLevelEncoder, MergeRules, Vocabulary};
//!
//! let mut vocab = Vocabulary::new();
//! vocab.initialize_specials(&["<unk>"]);
//! assert_eq!(vocab.insert("▁lo"), 1);
//!
//! let merges = MergeRules::from_pairs([("▁l", "o")]);
//! let encoder = CharLevelEncoder::new(Arc::new(merges));
//! assert_eq!(encoder.apply_merges("low"), vec!["▁lo", "w"]);
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Core BPE data structures
pub mod core;
pub use crate::core::vocab::{
    BOS_TOKEN, DEFAULT_SPECIAL_TOKENS, EOS_TOKEN, PAD_TOKEN, SEP_TOKEN, UNK_TOKEN,
};
pub use crate::core::{
    strip_word_start, word_pieces, MergeMap, MergeRules, Pair, PieceId, PieceTable,
    SpecialTokens, Vocab, VocabR, Vocabulary, WORD_START,
};

// Merge application
pub mod encoding;
pub use encoding::CharLevelEncoder;
