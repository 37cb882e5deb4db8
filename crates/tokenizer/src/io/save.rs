//! Save functionality for trained tokenizers.

use super::format::{Artifact, ArtifactMeta};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tokenmill_core::{MergeRules, Result, TokenizerError, Vocabulary};

/// Tokenizer saver - turns a trained model into an [`Artifact`] file.
pub struct TokenizerSaver<'a> {
    /// Vocabulary reference
    vocab: &'a Vocabulary,
    /// Merge rules reference
    merges: &'a MergeRules,
    /// Case folding flag recorded in the metadata
    lowercase: bool,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new tokenizer saver.
    pub fn new(vocab: &'a Vocabulary, merges: &'a MergeRules, lowercase: bool) -> Self {
        Self {
            vocab,
            merges,
            lowercase,
        }
    }

    /// Build the artifact for the model.
    pub fn artifact(&self) -> Artifact {
        Artifact {
            meta: ArtifactMeta {
                lowercase: self.lowercase,
                special_tokens: self.vocab.specials().map(str::to_string).collect(),
            },
            vocab: self
                .vocab
                .entries()
                .into_iter()
                .map(|(id, token)| (token.to_string(), id))
                .collect(),
            merges: self
                .merges
                .iter()
                .map(|(left, right)| (left.to_string(), right.to_string()))
                .collect(),
        }
    }

    /// Write the artifact to `path` as pretty JSON.
    ///
    /// Missing parent directories are created.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |err| TokenizerError::Io {
            path: path.to_path_buf(),
            err,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| TokenizerError::Io {
                path: parent.to_path_buf(),
                err,
            })?;
        }

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.artifact())?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;

        log::info!(
            "Saved tokenizer to {} ({} tokens, {} merges)",
            path.display(),
            self.vocab.len(),
            self.merges.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact() {
        let mut vocab = Vocabulary::new();
        vocab.initialize_specials(&["<unk>", "<bos>"]);
        vocab.insert("▁lo");
        let merges = MergeRules::from_pairs([("▁l", "o")]);

        let artifact = TokenizerSaver::new(&vocab, &merges, false).artifact();

        assert!(!artifact.meta.lowercase);
        assert_eq!(artifact.meta.special_tokens, vec!["<unk>", "<bos>"]);
        assert_eq!(artifact.vocab.len(), 3);
        assert_eq!(artifact.vocab.get("▁lo"), Some(&2));
        assert_eq!(artifact.merges, vec![("▁l".to_string(), "o".to_string())]);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tok.json");

        let mut vocab = Vocabulary::new();
        vocab.initialize_specials(&["<unk>"]);
        let merges = MergeRules::new();
        TokenizerSaver::new(&vocab, &merges, true).save(&path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        let artifact = Artifact::from_json(&json).unwrap();
        assert_eq!(artifact.vocab.get("<unk>"), Some(&0));
    }
}
