//! Merge application for BPE encoding.
//!
//! Code points are the atomic unit; merges are applied per word.

pub mod char_level;

pub use char_level::CharLevelEncoder;
