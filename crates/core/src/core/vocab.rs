//! Vocabulary storage and lookup.
//!
//! A [`Vocabulary`] is a bijection between token strings and `u32` ids.
//! Special tokens always come first: [`Vocabulary::initialize_specials`]
//! gives them ids `0..n` in declaration order, and every learned token
//! inserted afterwards receives the next free id.

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;

/// Forward mapping: token string -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Reverse mapping: ID -> token string
pub type VocabR = AHashMap<u32, CompactString>;

/// Padding token.
pub const PAD_TOKEN: &str = "<pad>";
/// Unknown token, substituted for lookup misses.
pub const UNK_TOKEN: &str = "<unk>";
/// Beginning of sequence token.
pub const BOS_TOKEN: &str = "<bos>";
/// End of sequence token.
pub const EOS_TOKEN: &str = "<eos>";
/// Separator token.
pub const SEP_TOKEN: &str = "<sep>";

/// The special tokens a freshly built tokenizer reserves, in id order.
pub const DEFAULT_SPECIAL_TOKENS: [&str; 5] =
    [PAD_TOKEN, UNK_TOKEN, BOS_TOKEN, EOS_TOKEN, SEP_TOKEN];

/// Vocabulary with forward and reverse mappings.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    vocab: Vocab,
    vocab_r: VocabR,
    /// Special token strings in declaration order
    specials: Vec<CompactString>,
    /// Special token IDs (cached for fast access)
    special: SpecialTokens,
    /// Next id handed out by [`Vocabulary::insert`]
    next_id: u32,
}

impl Vocabulary {
    /// Create a new empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new vocabulary with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vocab: Vocab::with_capacity(capacity),
            vocab_r: VocabR::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Reset the vocabulary to exactly the given special tokens.
    ///
    /// Specials receive ids `0..n` in order and the id counter restarts at
    /// `n`. Any previous content is discarded. A name repeated in the list
    /// keeps the id of its first occurrence.
    pub fn initialize_specials<S: AsRef<str>>(&mut self, specials: &[S]) {
        self.vocab.clear();
        self.vocab_r.clear();
        self.specials.clear();
        self.next_id = 0;

        for special in specials {
            let special = special.as_ref();
            if self.vocab.contains_key(special) {
                continue;
            }
            self.insert(special);
            self.specials.push(CompactString::new(special));
        }

        self.special = SpecialTokens::resolve(&self.vocab);
    }

    /// Add a token to the vocabulary.
    ///
    /// Returns the existing ID if the token is already present, otherwise
    /// assigns the next available ID.
    pub fn insert(&mut self, token: &str) -> u32 {
        if let Some(&id) = self.vocab.get(token) {
            return id;
        }

        let id = self.next_id;
        let token = CompactString::new(token);
        self.vocab_r.insert(id, token.clone());
        self.vocab.insert(token, id);
        self.next_id += 1;

        id
    }

    /// Add a token with a specific ID.
    ///
    /// Fails if the ID is bound to another token or the token to another ID.
    pub fn insert_with_id(&mut self, token: &str, id: u32) -> Result<()> {
        if let Some(existing) = self.vocab_r.get(&id) {
            if existing != token {
                return Err(TokenizerError::InvalidConfig(format!(
                    "Token ID {} already assigned to {:?}",
                    id, existing
                )));
            }
            return Ok(());
        }
        if let Some(&existing) = self.vocab.get(token) {
            return Err(TokenizerError::InvalidConfig(format!(
                "Token {:?} already assigned to ID {}",
                token, existing
            )));
        }

        let token = CompactString::new(token);
        self.vocab_r.insert(id, token.clone());
        self.vocab.insert(token, id);
        self.next_id = self.next_id.max(id.saturating_add(1));

        Ok(())
    }

    /// Build a vocabulary from explicit `(token, id)` entries.
    ///
    /// Every name in `specials` must be among the entries, holding ids `0..n`
    /// in declaration order.
    pub fn from_entries<S, I>(specials: &[S], entries: I) -> Result<Self>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (String, u32)>,
    {
        let entries = entries.into_iter();
        let mut vocab = Self::with_capacity(entries.size_hint().0);

        for (token, id) in entries {
            vocab.insert_with_id(&token, id)?;
        }

        for special in specials {
            let special = special.as_ref();
            let Some(&id) = vocab.vocab.get(special) else {
                return Err(TokenizerError::UnknownToken(special.to_string()));
            };
            if vocab.specials.iter().any(|s| s == special) {
                continue;
            }
            if id as usize != vocab.specials.len() {
                return Err(TokenizerError::InvalidConfig(format!(
                    "Special token {:?} has ID {}, expected {}",
                    special,
                    id,
                    vocab.specials.len()
                )));
            }
            vocab.specials.push(CompactString::new(special));
        }
        vocab.special = SpecialTokens::resolve(&vocab.vocab);

        Ok(vocab)
    }

    /// Look up the ID of a token.
    pub fn id_of(&self, token: &str) -> Result<u32> {
        self.get_id(token)
            .ok_or_else(|| TokenizerError::UnknownToken(token.to_string()))
    }

    /// Look up the token for an ID.
    pub fn token_of(&self, id: u32) -> Result<&str> {
        self.get_token(id)
            .ok_or(TokenizerError::UnknownTokenId(id))
    }

    /// Get the ID for a token string.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }

    /// Get the token string for an ID.
    #[inline]
    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.vocab_r.get(&id).map(|s| s.as_str())
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    /// The ID the next inserted token will receive.
    #[inline]
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Special token strings in declaration order.
    pub fn specials(&self) -> impl Iterator<Item = &str> + '_ {
        self.specials.iter().map(|s| s.as_str())
    }

    /// Cached IDs of the well-known special tokens.
    #[inline]
    pub fn special_tokens(&self) -> &SpecialTokens {
        &self.special
    }

    /// Check if an ID belongs to a declared special token.
    pub fn is_special(&self, id: u32) -> bool {
        self.get_token(id)
            .is_some_and(|token| self.specials.iter().any(|s| s == token))
    }

    /// Iterate over `(id, token)` pairs in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        let mut entries: Vec<(u32, &str)> = self
            .vocab_r
            .iter()
            .map(|(&id, token)| (id, token.as_str()))
            .collect();
        entries.sort_unstable_by_key(|&(id, _)| id);
        entries.into_iter()
    }

    /// All `(id, token)` entries in ascending ID order.
    pub fn entries(&self) -> Vec<(u32, &str)> {
        self.iter().collect()
    }
}

/// Special token IDs cached for fast access.
///
/// Resolved by name from the well-known special token strings; a role is
/// `None` when its token is not part of the vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecialTokens {
    /// Padding token ID
    pub pad: Option<u32>,
    /// Unknown token ID
    pub unk: Option<u32>,
    /// Beginning of sequence token ID
    pub bos: Option<u32>,
    /// End of sequence token ID
    pub eos: Option<u32>,
    /// Separator token ID
    pub sep: Option<u32>,
}

impl SpecialTokens {
    fn resolve(vocab: &Vocab) -> Self {
        Self {
            pad: vocab.get(PAD_TOKEN).copied(),
            unk: vocab.get(UNK_TOKEN).copied(),
            bos: vocab.get(BOS_TOKEN).copied(),
            eos: vocab.get(EOS_TOKEN).copied(),
            sep: vocab.get(SEP_TOKEN).copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_specials() {
        let mut vocab = Vocabulary::new();
        vocab.initialize_specials(&DEFAULT_SPECIAL_TOKENS);

        assert_eq!(vocab.len(), 5);
        assert_eq!(vocab.next_id(), 5);
        assert_eq!(vocab.get_id(PAD_TOKEN), Some(0));
        assert_eq!(vocab.get_id(UNK_TOKEN), Some(1));
        assert_eq!(vocab.get_id(BOS_TOKEN), Some(2));
        assert_eq!(vocab.get_id(EOS_TOKEN), Some(3));
        assert_eq!(vocab.get_id(SEP_TOKEN), Some(4));
        assert_eq!(vocab.special_tokens().unk, Some(1));
        assert_eq!(
            vocab.specials().collect::<Vec<_>>(),
            DEFAULT_SPECIAL_TOKENS.to_vec()
        );
    }

    #[test]
    fn test_initialize_specials_replaces_state() {
        let mut vocab = Vocabulary::new();
        vocab.initialize_specials(&DEFAULT_SPECIAL_TOKENS);
        vocab.insert("hello");

        vocab.initialize_specials(&["<unk>", "<bos>"]);

        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.get_id("hello"), None);
        assert_eq!(vocab.get_id("<unk>"), Some(0));
        assert_eq!(vocab.special_tokens().pad, None);
        assert_eq!(vocab.insert("hello"), 2);
    }

    #[test]
    fn test_insert() {
        let mut vocab = Vocabulary::new();
        vocab.initialize_specials(&["<unk>"]);
        let id1 = vocab.insert("hello");
        let id2 = vocab.insert("world");

        assert_eq!(id1, 1);
        assert_eq!(id2, 2);
        assert_eq!(vocab.get_token(1), Some("hello"));
        assert_eq!(vocab.get_token(2), Some("world"));
    }

    #[test]
    fn test_insert_duplicate_token() {
        let mut vocab = Vocabulary::new();
        let id1 = vocab.insert("hello");
        let id2 = vocab.insert("hello");

        assert_eq!(id1, id2);
        assert_eq!(vocab.len(), 1);
        assert_eq!(vocab.next_id(), 1);
    }

    #[test]
    fn test_lookup_errors() {
        let vocab = Vocabulary::new();

        assert!(matches!(
            vocab.id_of("missing"),
            Err(TokenizerError::UnknownToken(t)) if t == "missing"
        ));
        assert!(matches!(
            vocab.token_of(7),
            Err(TokenizerError::UnknownTokenId(7))
        ));
    }

    #[test]
    fn test_insert_with_id() {
        let mut vocab = Vocabulary::new();
        vocab.insert_with_id("hello", 5).unwrap();
        vocab.insert_with_id("world", 10).unwrap();

        assert_eq!(vocab.get_id("hello"), Some(5));
        assert_eq!(vocab.get_token(10), Some("world"));
        assert_eq!(vocab.next_id(), 11);

        // Same binding twice is fine, conflicting bindings are not.
        assert!(vocab.insert_with_id("hello", 5).is_ok());
        assert!(vocab.insert_with_id("other", 5).is_err());
        assert!(vocab.insert_with_id("hello", 6).is_err());
    }

    #[test]
    fn test_from_entries() {
        let entries = vec![
            ("<unk>".to_string(), 0),
            ("<bos>".to_string(), 1),
            ("▁hi".to_string(), 2),
        ];
        let vocab = Vocabulary::from_entries(&["<unk>", "<bos>"], entries).unwrap();

        assert_eq!(vocab.len(), 3);
        assert!(vocab.is_special(0));
        assert!(vocab.is_special(1));
        assert!(!vocab.is_special(2));
        assert_eq!(vocab.special_tokens().bos, Some(1));
        assert_eq!(vocab.entries(), vec![(0, "<unk>"), (1, "<bos>"), (2, "▁hi")]);
    }

    #[test]
    fn test_from_entries_misplaced_special() {
        let entries = vec![("a".to_string(), 0), ("<unk>".to_string(), 1)];
        let result = Vocabulary::from_entries(&["<unk>"], entries);

        assert!(matches!(result, Err(TokenizerError::InvalidConfig(_))));
    }

    #[test]
    fn test_iter_in_id_order() {
        let mut vocab = Vocabulary::new();
        vocab.insert_with_id("c", 2).unwrap();
        vocab.insert_with_id("a", 0).unwrap();
        vocab.insert_with_id("b", 1).unwrap();

        let ids: Vec<u32> = vocab.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(vocab.iter().nth(2), Some((2, "c")));
    }

    #[test]
    fn test_from_entries_missing_special() {
        let entries = vec![("a".to_string(), 0)];
        let result = Vocabulary::from_entries(&["<unk>"], entries);

        assert!(matches!(result, Err(TokenizerError::UnknownToken(t)) if t == "<unk>"));
    }
}
