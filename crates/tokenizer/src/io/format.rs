//! Persisted artifact schema.
//!
//! A trained tokenizer is stored as one JSON document:
//!
//! ```json
//! {
//!   "meta":   { "lowercase": true, "special_tokens": ["<pad>", "<unk>"] },
//!   "vocab":  { "<pad>": 0, "<unk>": 1, "▁low": 2 },
//!   "merges": [["▁l", "o"], ["▁lo", "w"]]
//! }
//! ```
//!
//! Writing goes through serde derives. Reading goes through
//! [`Artifact::from_value`], which checks the structure field by field so
//! every defect surfaces as [`TokenizerError::MalformedArtifact`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tokenmill_core::{Result, TokenizerError};

/// Tokenizer configuration carried by the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactMeta {
    /// Whether input is NFC-normalized and lowercased
    pub lowercase: bool,
    /// Special tokens in id order
    pub special_tokens: Vec<String>,
}

/// Complete tokenizer artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Configuration
    pub meta: ArtifactMeta,
    /// Token -> ID mapping, sorted by token for stable output
    pub vocab: BTreeMap<String, u32>,
    /// Merge rules in rank order
    pub merges: Vec<(String, String)>,
}

fn malformed(msg: impl Into<String>) -> TokenizerError {
    TokenizerError::MalformedArtifact(msg.into())
}

fn field<'a>(object: &'a Map<String, Value>, name: &str, parent: &str) -> Result<&'a Value> {
    object
        .get(name)
        .ok_or_else(|| malformed(format!("missing field `{}` in {}", name, parent)))
}

impl Artifact {
    /// Parse an artifact from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Validate and convert a parsed JSON document.
    ///
    /// Unknown top-level fields are ignored. Vocab entries whose id is not a
    /// non-negative integer fitting in `u32` are skipped.
    pub fn from_value(value: Value) -> Result<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| malformed("artifact root must be an object"))?;

        let meta = Self::parse_meta(field(root, "meta", "artifact")?)?;
        let vocab = Self::parse_vocab(field(root, "vocab", "artifact")?)?;
        let merges = Self::parse_merges(field(root, "merges", "artifact")?)?;

        Ok(Self {
            meta,
            vocab,
            merges,
        })
    }

    fn parse_meta(value: &Value) -> Result<ArtifactMeta> {
        let meta = value
            .as_object()
            .ok_or_else(|| malformed("`meta` must be an object"))?;

        let lowercase = field(meta, "lowercase", "`meta`")?
            .as_bool()
            .ok_or_else(|| malformed("`meta.lowercase` must be a boolean"))?;

        let special_tokens = field(meta, "special_tokens", "`meta`")?
            .as_array()
            .ok_or_else(|| malformed("`meta.special_tokens` must be an array"))?
            .iter()
            .map(|token| {
                token
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| malformed(format!("special token {} is not a string", token)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ArtifactMeta {
            lowercase,
            special_tokens,
        })
    }

    fn parse_vocab(value: &Value) -> Result<BTreeMap<String, u32>> {
        let entries = value
            .as_object()
            .ok_or_else(|| malformed("`vocab` must be an object"))?;

        let mut vocab = BTreeMap::new();
        for (token, id) in entries {
            match id.as_u64().and_then(|id| u32::try_from(id).ok()) {
                Some(id) => {
                    vocab.insert(token.clone(), id);
                }
                None => log::debug!("Skipping vocab entry {:?} with invalid id {}", token, id),
            }
        }
        Ok(vocab)
    }

    fn parse_merges(value: &Value) -> Result<Vec<(String, String)>> {
        let merges = value
            .as_array()
            .ok_or_else(|| malformed("`merges` must be an array"))?;

        merges
            .iter()
            .enumerate()
            .map(|(rank, merge)| match merge.as_array().map(Vec::as_slice) {
                Some([Value::String(left), Value::String(right)]) => {
                    Ok((left.clone(), right.clone()))
                }
                _ => Err(malformed(format!(
                    "merge {} must be a two-string array, got {}",
                    rank, merge
                ))),
            })
            .collect()
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "meta": { "lowercase": true, "special_tokens": ["<pad>", "<unk>"] },
            "vocab": { "<pad>": 0, "<unk>": 1, "▁lo": 2, "w": 3 },
            "merges": [["▁l", "o"]]
        })
    }

    #[test]
    fn test_parse_valid() {
        let artifact = Artifact::from_value(sample()).unwrap();

        assert!(artifact.meta.lowercase);
        assert_eq!(artifact.meta.special_tokens, vec!["<pad>", "<unk>"]);
        assert_eq!(artifact.vocab.get("▁lo"), Some(&2));
        assert_eq!(artifact.merges, vec![("▁l".to_string(), "o".to_string())]);
    }

    #[test]
    fn test_serialized_shape() {
        let artifact = Artifact::from_value(sample()).unwrap();
        let value: Value = serde_json::from_str(&artifact.to_json().unwrap()).unwrap();

        assert_eq!(value, sample());
    }

    #[test]
    fn test_vocab_written_sorted() {
        let artifact = Artifact::from_value(sample()).unwrap();
        let json = artifact.to_json().unwrap();

        let pad = json.find("\"<pad>\": 0").unwrap();
        let unk = json.find("\"<unk>\": 1").unwrap();
        let w = json.find("\"w\": 3").unwrap();
        assert!(pad < unk && unk < w);
    }

    #[test]
    fn test_missing_sections() {
        for key in ["meta", "vocab", "merges"] {
            let mut value = sample();
            value.as_object_mut().unwrap().remove(key);
            assert!(matches!(
                Artifact::from_value(value),
                Err(TokenizerError::MalformedArtifact(msg)) if msg.contains(key)
            ));
        }
    }

    #[test]
    fn test_ill_typed_fields() {
        let mut value = sample();
        value["meta"]["lowercase"] = json!("yes");
        assert!(matches!(
            Artifact::from_value(value),
            Err(TokenizerError::MalformedArtifact(_))
        ));

        let mut value = sample();
        value["meta"]["special_tokens"] = json!(["<pad>", 7]);
        assert!(matches!(
            Artifact::from_value(value),
            Err(TokenizerError::MalformedArtifact(_))
        ));

        let mut value = sample();
        value["merges"] = json!([["a", "b", "c"]]);
        assert!(matches!(
            Artifact::from_value(value),
            Err(TokenizerError::MalformedArtifact(_))
        ));

        let mut value = sample();
        value["merges"] = json!([["a", 1]]);
        assert!(matches!(
            Artifact::from_value(value),
            Err(TokenizerError::MalformedArtifact(_))
        ));
    }

    #[test]
    fn test_invalid_ids_skipped() {
        let mut value = sample();
        value["vocab"]["neg"] = json!(-1);
        value["vocab"]["text"] = json!("4");
        value["vocab"]["huge"] = json!(u64::from(u32::MAX) + 1);
        value["vocab"]["frac"] = json!(2.5);

        let artifact = Artifact::from_value(value).unwrap();
        assert_eq!(artifact.vocab.len(), 4);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let mut value = sample();
        value["version"] = json!("0.1.0");
        assert!(Artifact::from_value(value).is_ok());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Artifact::from_json("{not json"),
            Err(TokenizerError::Json(_))
        ));
    }
}
