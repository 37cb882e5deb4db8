//! BPE trainer implementation.
//!
//! Learns an ordered merge table from a corpus by repeatedly merging the most
//! frequent adjacent piece pair. Every iteration recounts pairs from the
//! current word representations, so the selected pair always reflects the
//! corpus as rewritten by all previous merges.

use super::counter::PairCounter;
use tokenmill_core::{MergeRules, Result, TokenizerError, Vocabulary, DEFAULT_SPECIAL_TOKENS};

/// Configuration for BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingConfig {
    /// Minimum frequency for a word to take part in pair counting, and for a
    /// pair to be merged
    pub min_frequency: u64,
    /// Upper bound on the number of merges learned
    pub max_merge_operations: usize,
    /// Whether to count pairs and rewrite words with rayon
    pub parallel: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            min_frequency: 2,
            max_merge_operations: 1_000,
            parallel: false,
        }
    }
}

impl TrainingConfig {
    /// Check the configuration before training.
    pub fn validate(&self) -> Result<()> {
        if self.min_frequency == 0 {
            return Err(TokenizerError::InvalidConfig(
                "min_frequency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// BPE trainer.
///
/// Expects already-normalized text; splitting into lines and words happens
/// here.
#[derive(Debug, Clone)]
pub struct BpeTrainer {
    /// Configuration
    config: TrainingConfig,
    /// Special tokens placed at the front of the trained vocabulary
    special_tokens: Vec<String>,
    /// Source frequency of each learned merge, by rank
    merge_frequencies: Vec<u64>,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the default special tokens.
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            special_tokens: DEFAULT_SPECIAL_TOKENS.iter().map(|s| s.to_string()).collect(),
            merge_frequencies: Vec::new(),
        }
    }

    /// Replace the special tokens reserved at the lowest ids.
    pub fn with_special_tokens<S: Into<String>>(
        mut self,
        special_tokens: impl IntoIterator<Item = S>,
    ) -> Self {
        self.special_tokens = special_tokens.into_iter().map(Into::into).collect();
        self
    }

    /// The training configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Frequencies of the pairs merged by the last [`Self::train`] call, by rank.
    pub fn merge_frequencies(&self) -> &[u64] {
        &self.merge_frequencies
    }

    /// Train on the given text.
    ///
    /// # Returns
    /// The trained vocabulary and merge rules
    pub fn train(&mut self, text: &str) -> Result<(Vocabulary, MergeRules)> {
        self.train_words(text.lines().flat_map(str::split_whitespace))
    }

    /// Train on an already split word stream, in corpus order.
    pub fn train_words<'a, I>(&mut self, words: I) -> Result<(Vocabulary, MergeRules)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.config.validate()?;
        self.merge_frequencies.clear();

        let mut merges = MergeRules::new();
        let mut counter = PairCounter::new();
        for word in words {
            counter.add_word(word, &mut merges);
        }

        self.learn_merges(&mut counter, &mut merges);

        let vocab = self.build_vocab(&counter, &merges);

        log::info!(
            "Finished training: {} merges learned, vocab size = {}",
            merges.len(),
            vocab.len()
        );

        Ok((vocab, merges))
    }

    /// Run the merge loop, rewriting the words in `counter` as rules are added.
    fn learn_merges(&mut self, counter: &mut PairCounter, merges: &mut MergeRules) {
        let max_merges = self.config.max_merge_operations;
        log::info!(
            "Starting BPE training: {} unique words ({} occurrences), up to {} merges",
            counter.word_count(),
            counter.total_word_occurrences(),
            max_merges
        );

        let mut last_log_percent = 0;

        while merges.len() < max_merges {
            let pair_counts = counter.count_pairs(self.config.min_frequency, self.config.parallel);

            let Some(best) = pair_counts.best() else {
                log::info!("No pairs left to merge after {} merges", merges.len());
                break;
            };
            if best.count < self.config.min_frequency {
                log::info!(
                    "Best pair frequency {} below min_frequency {}, stopping after {} merges",
                    best.count,
                    self.config.min_frequency,
                    merges.len()
                );
                break;
            }

            let (rank, merged) = merges.add_merge(best.pair);
            counter.merge_pair_in_words(best.pair, merged, self.config.parallel);
            self.merge_frequencies.push(best.count);

            log::debug!(
                "Merge {}: {:?} + {:?} -> {:?} (frequency: {})",
                rank,
                merges.pieces().resolve(best.pair.0),
                merges.pieces().resolve(best.pair.1),
                merges.pieces().resolve(merged),
                best.count
            );

            let current_percent = (merges.len() * 100) / max_merges;
            if current_percent >= last_log_percent + 10 {
                log::info!(
                    "Progress: {}% ({}/{} merges)",
                    current_percent,
                    merges.len(),
                    max_merges
                );
                last_log_percent = current_percent;
            }
        }
    }

    /// Specials first, then every piece of every word in corpus order.
    fn build_vocab(&self, counter: &PairCounter, merges: &MergeRules) -> Vocabulary {
        let mut vocab = Vocabulary::new();
        vocab.initialize_specials(self.special_tokens.as_slice());

        for word in counter.words() {
            for &piece in word {
                vocab.insert(merges.pieces().resolve(piece));
            }
        }

        vocab
    }
}
