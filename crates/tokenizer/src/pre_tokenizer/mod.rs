//! Pre-tokenization pipeline.
//!
//! Normalization and splitting applied identically before training and
//! before encoding.

pub mod normalize;
pub mod split;

pub use normalize::Normalizer;
pub use split::{Segment, Splitter};
