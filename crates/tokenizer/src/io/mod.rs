//! Artifact serialization for trained tokenizers.
//!
//! One JSON file holds the configuration, the vocabulary and the ordered
//! merge rules.

pub mod format;
pub mod load;
pub mod save;

pub use format::{Artifact, ArtifactMeta};
pub use load::TokenizerLoader;
pub use save::TokenizerSaver;
