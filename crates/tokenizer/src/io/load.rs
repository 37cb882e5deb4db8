//! Load functionality for trained tokenizers.

use super::format::{Artifact, ArtifactMeta};
use ahash::AHashMap;
use std::path::Path;
use tokenmill_core::{MergeRules, Result, TokenizerError, Vocabulary, UNK_TOKEN};

/// Tokenizer loader - validates an [`Artifact`] and rebuilds the model.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load a model from an artifact file.
    pub fn load(path: &Path) -> Result<(Vocabulary, MergeRules, ArtifactMeta)> {
        let json = std::fs::read_to_string(path).map_err(|err| TokenizerError::Io {
            path: path.to_path_buf(),
            err,
        })?;

        let model = Self::from_artifact(Artifact::from_json(&json)?)?;
        log::info!(
            "Loaded tokenizer from {} ({} tokens, {} merges)",
            path.display(),
            model.0.len(),
            model.1.len()
        );
        Ok(model)
    }

    /// Rebuild vocabulary and merge rules from a parsed artifact.
    ///
    /// Special tokens must hold ids `0..n` in declaration order and every
    /// other token an id of at least `n`. Also fails on two tokens sharing
    /// an id and on a special token list without the unknown token.
    pub fn from_artifact(artifact: Artifact) -> Result<(Vocabulary, MergeRules, ArtifactMeta)> {
        let Artifact {
            meta,
            vocab: entries,
            merges,
        } = artifact;

        let specials = &meta.special_tokens;
        for (expected, special) in specials.iter().enumerate() {
            match entries.get(special) {
                None => {
                    return Err(TokenizerError::MalformedArtifact(format!(
                        "special token {:?} missing from vocab",
                        special
                    )));
                }
                Some(&id) if id as usize != expected => {
                    return Err(TokenizerError::MalformedArtifact(format!(
                        "special token {:?} has id {}, expected {}",
                        special, id, expected
                    )));
                }
                Some(_) => {}
            }
        }

        let mut seen: AHashMap<u32, &str> = AHashMap::with_capacity(entries.len());
        for (token, &id) in &entries {
            if (id as usize) < specials.len() && !specials.contains(token) {
                return Err(TokenizerError::MalformedArtifact(format!(
                    "token {:?} has id {} inside the special token range 0..{}",
                    token,
                    id,
                    specials.len()
                )));
            }
            if let Some(previous) = seen.insert(id, token.as_str()) {
                return Err(TokenizerError::MalformedArtifact(format!(
                    "duplicate id {} for tokens {:?} and {:?}",
                    id, previous, token
                )));
            }
        }

        if !meta.special_tokens.iter().any(|s| s == UNK_TOKEN) {
            return Err(TokenizerError::MalformedArtifact(format!(
                "special tokens must include {}",
                UNK_TOKEN
            )));
        }

        let vocab = Vocabulary::from_entries(meta.special_tokens.as_slice(), entries)
            .map_err(|e| TokenizerError::MalformedArtifact(e.to_string()))?;
        let merges = MergeRules::from_pairs(merges);

        Ok((vocab, merges, meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::save::TokenizerSaver;
    use serde_json::json;

    fn artifact(value: serde_json::Value) -> Artifact {
        Artifact::from_value(value).unwrap()
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");

        let mut vocab = Vocabulary::new();
        vocab.initialize_specials(&["<pad>", "<unk>"]);
        vocab.insert("▁low");
        vocab.insert("e");
        let merges = MergeRules::from_pairs([("▁l", "o"), ("▁lo", "w")]);
        TokenizerSaver::new(&vocab, &merges, true).save(&path).unwrap();

        let (loaded_vocab, loaded_merges, meta) = TokenizerLoader::load(&path).unwrap();

        assert!(meta.lowercase);
        assert_eq!(loaded_vocab.entries(), vocab.entries());
        assert_eq!(
            loaded_vocab.specials().collect::<Vec<_>>(),
            vec!["<pad>", "<unk>"]
        );
        assert_eq!(loaded_merges, merges);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        assert!(matches!(
            TokenizerLoader::load(&path),
            Err(TokenizerError::Io { path: p, .. }) if p == path
        ));
    }

    #[test]
    fn test_duplicate_ids() {
        let result = TokenizerLoader::from_artifact(artifact(json!({
            "meta": { "lowercase": true, "special_tokens": ["<unk>"] },
            "vocab": { "<unk>": 0, "a": 1, "b": 1 },
            "merges": []
        })));

        assert!(matches!(result, Err(TokenizerError::MalformedArtifact(msg)) if msg.contains("duplicate id 1")));
    }

    #[test]
    fn test_missing_special() {
        let result = TokenizerLoader::from_artifact(artifact(json!({
            "meta": { "lowercase": true, "special_tokens": ["<unk>", "<bos>"] },
            "vocab": { "<unk>": 0, "a": 1 },
            "merges": []
        })));

        assert!(matches!(result, Err(TokenizerError::MalformedArtifact(msg)) if msg.contains("<bos>")));
    }

    #[test]
    fn test_specials_must_hold_lowest_ids() {
        let result = TokenizerLoader::from_artifact(artifact(json!({
            "meta": { "lowercase": true, "special_tokens": ["<pad>", "<unk>"] },
            "vocab": { "a": 0, "<pad>": 7, "<unk>": 9, "b": 1 },
            "merges": []
        })));
        assert!(matches!(result, Err(TokenizerError::MalformedArtifact(msg)) if msg.contains("<pad>")));

        let swapped = TokenizerLoader::from_artifact(artifact(json!({
            "meta": { "lowercase": true, "special_tokens": ["<pad>", "<unk>"] },
            "vocab": { "<pad>": 1, "<unk>": 0, "a": 2 },
            "merges": []
        })));
        assert!(matches!(swapped, Err(TokenizerError::MalformedArtifact(_))));
    }

    #[test]
    fn test_learned_token_inside_special_range() {
        let result = TokenizerLoader::from_artifact(artifact(json!({
            "meta": { "lowercase": true, "special_tokens": ["<unk>"] },
            "vocab": { "<unk>": 0, "a": 0, "b": 1 },
            "merges": []
        })));
        assert!(matches!(result, Err(TokenizerError::MalformedArtifact(msg)) if msg.contains("special token range")));
    }

    #[test]
    fn test_unknown_token_required() {
        let result = TokenizerLoader::from_artifact(artifact(json!({
            "meta": { "lowercase": false, "special_tokens": ["<pad>"] },
            "vocab": { "<pad>": 0 },
            "merges": []
        })));

        assert!(matches!(result, Err(TokenizerError::MalformedArtifact(_))));
    }

    #[test]
    fn test_skipped_ids_do_not_reach_vocab() {
        let (vocab, _, _) = TokenizerLoader::from_artifact(artifact(json!({
            "meta": { "lowercase": true, "special_tokens": ["<unk>"] },
            "vocab": { "<unk>": 0, "a": 1, "bad": -3 },
            "merges": [["a", "a"]]
        })))
        .unwrap();

        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.get_id("bad"), None);
    }
}
