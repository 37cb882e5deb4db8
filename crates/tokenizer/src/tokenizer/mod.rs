//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that ties the
//! vocabulary, the merge rules and the pre-tokenization pipeline together.

use crate::io::{Artifact, ArtifactMeta, TokenizerLoader, TokenizerSaver};
use crate::pre_tokenizer::{Normalizer, Segment, Splitter};
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tokenmill_core::{
    strip_word_start, CharLevelEncoder, MergeRules, Result, TokenizerError, Vocabulary,
    DEFAULT_SPECIAL_TOKENS, UNK_TOKEN,
};
use tokenmill_training::{BpeTrainer, TrainingConfig};

/// Token name for a whitespace run of `len` code points.
///
/// Training never produces these tokens, so encoding with
/// [`EncodeOptions::keep_whitespace`] normally falls back to `<unk>`.
pub fn whitespace_token(len: usize) -> String {
    format!("<ws:{}>", len)
}

/// Configuration for building a tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// NFC-normalize and lowercase text before training and encoding
    pub lowercase: bool,
    /// Special tokens, assigned ids `0..n` in this order
    pub special_tokens: Vec<String>,
    /// Minimum word and pair frequency during training
    pub min_frequency: u64,
    /// Maximum number of merges learned
    pub max_merge_operations: usize,
    /// Use rayon for pair counting and merge rewriting
    pub parallel: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        let training = TrainingConfig::default();
        Self {
            lowercase: true,
            special_tokens: DEFAULT_SPECIAL_TOKENS.iter().map(|s| s.to_string()).collect(),
            min_frequency: training.min_frequency,
            max_merge_operations: training.max_merge_operations,
            parallel: training.parallel,
        }
    }
}

impl TokenizerConfig {
    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        self.training_config().validate()?;

        if self.special_tokens.iter().any(String::is_empty) {
            return Err(TokenizerError::InvalidConfig(
                "special token names must not be empty".to_string(),
            ));
        }
        if !self.special_tokens.iter().any(|s| s == UNK_TOKEN) {
            return Err(TokenizerError::InvalidConfig(format!(
                "special tokens must include {}",
                UNK_TOKEN
            )));
        }
        Ok(())
    }

    fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            min_frequency: self.min_frequency,
            max_merge_operations: self.max_merge_operations,
            parallel: self.parallel,
        }
    }
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable case folding.
    pub fn lowercase(mut self, lowercase: bool) -> Self {
        self.config.lowercase = lowercase;
        self
    }

    /// Set the special tokens.
    pub fn special_tokens<S: Into<String>>(mut self, tokens: impl IntoIterator<Item = S>) -> Self {
        self.config.special_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Set the minimum frequency for merges.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.min_frequency = freq;
        self
    }

    /// Set the maximum number of merges.
    pub fn max_merge_operations(mut self, ops: usize) -> Self {
        self.config.max_merge_operations = ops;
        self
    }

    /// Enable parallel training.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Build an untrained tokenizer holding only the special tokens.
    pub fn build(self) -> Result<Tokenizer> {
        Tokenizer::new(self.config)
    }

    /// Build a tokenizer and train it on `corpus`.
    pub fn train(self, corpus: &str) -> Result<Tokenizer> {
        let mut tokenizer = self.build()?;
        tokenizer.train(corpus)?;
        Ok(tokenizer)
    }
}

/// Options for [`Tokenizer::encode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Wrap the output in `<bos>` ... `<eos>`
    pub add_boundary_markers: bool,
    /// Emit a `<ws:N>` token (or `<unk>`) for each whitespace run instead of dropping it
    pub keep_whitespace: bool,
}

/// Options for [`Tokenizer::decode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Drop special tokens, including `<unk>` substituted for unknown ids
    pub skip_special_tokens: bool,
}

/// Main tokenizer struct.
///
/// Immutable once trained or loaded; encoding and decoding take `&self`.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Vocabulary
    vocab: Vocabulary,
    /// Merge application over the shared rule table
    encoder: CharLevelEncoder,
    /// Configuration
    config: TokenizerConfig,
    /// Unicode normalizer
    normalizer: Normalizer,
    /// Text splitter
    splitter: Splitter,
    /// Cached id of `<unk>`
    unk_id: u32,
}

impl Tokenizer {
    /// Create an untrained tokenizer with the given configuration.
    pub fn new(config: TokenizerConfig) -> Result<Self> {
        config.validate()?;

        let mut vocab = Vocabulary::with_capacity(config.special_tokens.len());
        vocab.initialize_specials(config.special_tokens.as_slice());

        Self::from_parts(vocab, MergeRules::new(), config)
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    fn from_parts(vocab: Vocabulary, merges: MergeRules, config: TokenizerConfig) -> Result<Self> {
        let unk_id = vocab
            .special_tokens()
            .unk
            .ok_or_else(|| {
                TokenizerError::InvalidConfig(format!("special tokens must include {}", UNK_TOKEN))
            })?;

        Ok(Self {
            vocab,
            encoder: CharLevelEncoder::new(Arc::new(merges)),
            normalizer: Normalizer::new(config.lowercase),
            splitter: Splitter::new(),
            config,
            unk_id,
        })
    }

    /// Train the tokenizer on a corpus, replacing its vocabulary and merges.
    pub fn train(&mut self, corpus: &str) -> Result<()> {
        let normalized = self.normalizer.normalize(corpus);

        let mut trainer = BpeTrainer::new(self.config.training_config())
            .with_special_tokens(self.config.special_tokens.iter().cloned());
        let (vocab, merges) = trainer.train_words(self.splitter.words(&normalized))?;

        *self = Self::from_parts(vocab, merges, self.config.clone())?;
        Ok(())
    }

    /// Split text into pieces.
    ///
    /// Words go through the merge rules; whitespace runs are kept verbatim.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = self.normalizer.normalize(text);
        let mut pieces = Vec::new();

        for segment in self.splitter.segments(&normalized) {
            match segment {
                Segment::Word(word) => pieces.extend(
                    self.encoder
                        .apply_merges(word)
                        .into_iter()
                        .map(|piece| piece.to_string()),
                ),
                Segment::Whitespace(ws) => pieces.push(ws.to_string()),
            }
        }

        pieces
    }

    /// Encode text to token IDs.
    ///
    /// Pieces missing from the vocabulary become `<unk>`; encoding never fails.
    pub fn encode(&self, text: &str, options: EncodeOptions) -> Encoding {
        let normalized = self.normalizer.normalize(text);
        let mut encoding = Encoding::default();
        let special = *self.vocab.special_tokens();

        if options.add_boundary_markers {
            if let Some(bos) = special.bos {
                self.push_id(&mut encoding, bos);
            }
        }

        for segment in self.splitter.segments(&normalized) {
            match segment {
                Segment::Word(word) => {
                    for piece in self.encoder.apply_merges(word) {
                        self.push_token(&mut encoding, &piece);
                    }
                }
                Segment::Whitespace(ws) if options.keep_whitespace => {
                    self.push_token(&mut encoding, &whitespace_token(ws.chars().count()));
                }
                Segment::Whitespace(_) => {}
            }
        }

        if options.add_boundary_markers {
            if let Some(eos) = special.eos {
                self.push_id(&mut encoding, eos);
            }
        }

        encoding
    }

    fn push_token(&self, encoding: &mut Encoding, token: &str) {
        let id = self.vocab.get_id(token).unwrap_or(self.unk_id);
        self.push_id(encoding, id);
    }

    fn push_id(&self, encoding: &mut Encoding, id: u32) {
        let token = self.vocab.get_token(id).unwrap_or(UNK_TOKEN);
        encoding.ids.push(id);
        encoding.tokens.push(token.to_string());
    }

    /// Encode a batch of texts in parallel.
    pub fn encode_batch<S>(&self, texts: &[S], options: EncodeOptions) -> Vec<Encoding>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref(), options))
            .collect()
    }

    /// Decode token IDs back to text.
    ///
    /// Unknown ids decode as `<unk>`. The word-start marker is stripped and
    /// no separator is inserted between words.
    pub fn decode(&self, ids: &[u32], options: DecodeOptions) -> String {
        let mut text = String::new();

        for &id in ids {
            let token = match self.vocab.get_token(id) {
                Some(_) if options.skip_special_tokens && self.vocab.is_special(id) => continue,
                Some(token) => token,
                None if options.skip_special_tokens => continue,
                None => UNK_TOKEN,
            };
            text.push_str(strip_word_start(token));
        }

        text
    }

    /// Look up the ID of a token.
    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.vocab.get_id(token)
    }

    /// Look up the token for an ID.
    pub fn id_to_token(&self, id: u32) -> Option<&str> {
        self.vocab.get_token(id)
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Get the number of merge rules.
    pub fn merge_count(&self) -> usize {
        self.encoder.merges().len()
    }

    /// Merge rules in rank order.
    pub fn merges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.encoder.merges().iter()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Get the configuration.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Export the tokenizer as an artifact.
    pub fn to_artifact(&self) -> Artifact {
        TokenizerSaver::new(&self.vocab, self.encoder.merges(), self.config.lowercase).artifact()
    }

    /// Rebuild a tokenizer from a validated artifact.
    pub fn from_artifact(artifact: Artifact) -> Result<Self> {
        let (vocab, merges, meta) = TokenizerLoader::from_artifact(artifact)?;
        Self::from_parts(vocab, merges, Self::config_from_meta(meta))
    }

    fn config_from_meta(meta: ArtifactMeta) -> TokenizerConfig {
        TokenizerConfig {
            lowercase: meta.lowercase,
            special_tokens: meta.special_tokens,
            ..TokenizerConfig::default()
        }
    }

    /// Save the tokenizer to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        TokenizerSaver::new(&self.vocab, self.encoder.merges(), self.config.lowercase).save(path)
    }

    /// Load a tokenizer from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let (vocab, merges, meta) = TokenizerLoader::load(path)?;
        Self::from_parts(vocab, merges, Self::config_from_meta(meta))
    }
}

/// Result of encoding text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoding {
    /// Token IDs
    pub ids: Vec<u32>,
    /// Token strings, aligned with `ids`
    pub tokens: Vec<String>,
}

impl Encoding {
    /// Get the number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
