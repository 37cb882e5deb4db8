//! tokenmill-training - BPE training infrastructure
//!
//! This crate learns an ordered list of BPE merge rules from normalized text
//! and builds the matching vocabulary.
//!
//! # Features
//!
//! - Pair frequency counting with an optional rayon map-reduce
//! - Deterministic merge selection: highest count, earliest-seen pair on ties
//! - Word-level `min_frequency` filtering and a cap on merge operations
//!
//! # Example
//!
//! ```rust
//! use tokenmill_training::{BpeTrainer, TrainingConfig};
//!
//! let config = TrainingConfig {
//!     min_frequency: 2,
//!     max_merge_operations: 5,
//!     ..Default::default()
//! };
//!
//! let mut trainer = BpeTrainer::new(config);
//! let (vocab, merges) = trainer.train("low low low lower lowest")?;
//! assert_eq!(merges.len(), 2);
//! assert!(vocab.get_id("▁low").is_some());
//! # Ok::<(), tokenmill_training::TokenizerError>(())
//! ```

pub use tokenmill_core::{Result, TokenizerError};

// Training infrastructure
pub mod training;
pub use training::{BpeTrainer, MergeCandidate, PairCounter, PairTable, TrainingConfig};
