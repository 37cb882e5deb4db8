//! tokenmill-tokenizer - High-level tokenizer API
//!
//! This crate ties the vocabulary, the merge rules and the pre-tokenization
//! pipeline into a single [`Tokenizer`] that trains, encodes, decodes and
//! persists itself as a JSON artifact.
//!
//! # Features
//!
//! - Builder-style configuration (case folding, special tokens, training limits)
//! - Whitespace-preserving tokenization and `<unk>` substitution on lookup misses
//! - Optional `<bos>`/`<eos>` boundary markers and batch encoding with rayon
//! - Strictly validated artifact loading
//!
//! # Example
//!
//! ```rust
//! use tokenmill_tokenizer::{DecodeOptions, EncodeOptions, Tokenizer};
//!
//! let tokenizer = Tokenizer::builder()
//!     .min_frequency(2)
//!     .max_merge_operations(5)
//!     .train("low low low lower lowest")?;
//!
//! let encoding = tokenizer.encode("lowest", EncodeOptions::default());
//! let text = tokenizer.decode(&encoding.ids, DecodeOptions::default());
//! assert_eq!(text, "lowest");
//! # Ok::<(), tokenmill_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use tokenmill_core::{Result, TokenizerError, Vocabulary};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{
    whitespace_token, DecodeOptions, EncodeOptions, Encoding, Tokenizer, TokenizerBuilder,
    TokenizerConfig,
};

// IO/Serialization
pub mod io;
pub use io::{Artifact, ArtifactMeta, TokenizerLoader, TokenizerSaver};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{Normalizer, Segment, Splitter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
