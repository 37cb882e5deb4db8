//! Train command implementation.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tokenmill_tokenizer::Tokenizer;

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Path to the training corpus
    pub corpus: PathBuf,

    /// Output path for the tokenizer artifact
    pub out: PathBuf,

    /// Minimum word and pair frequency
    #[arg(long = "minfreq", default_value_t = 2)]
    pub min_frequency: u64,

    /// Maximum number of merge operations
    #[arg(long = "ops", default_value_t = 1_000)]
    pub max_merge_operations: usize,

    /// Keep case and skip Unicode normalization
    #[arg(long)]
    pub cased: bool,

    /// Count pairs in parallel
    #[arg(long)]
    pub parallel: bool,
}

pub fn run(cmd: TrainCommand) -> Result<()> {
    let start = Instant::now();
    let corpus = fs::read_to_string(&cmd.corpus)
        .with_context(|| format!("Failed to read corpus {}", cmd.corpus.display()))?;
    log::info!(
        "Read {} bytes from {} in {:.2}s",
        corpus.len(),
        cmd.corpus.display(),
        start.elapsed().as_secs_f64()
    );

    let start = Instant::now();
    let tokenizer = Tokenizer::builder()
        .lowercase(!cmd.cased)
        .min_frequency(cmd.min_frequency)
        .max_merge_operations(cmd.max_merge_operations)
        .parallel(cmd.parallel)
        .train(&corpus)
        .context("Training failed")?;
    log::info!("Training completed in {:.2}s", start.elapsed().as_secs_f64());

    tokenizer
        .save(&cmd.out)
        .with_context(|| format!("Failed to save tokenizer to {}", cmd.out.display()))?;

    println!(
        "Trained {} merges, vocab size {}, saved to {}",
        tokenizer.merge_count(),
        tokenizer.vocab_size(),
        cmd.out.display()
    );

    Ok(())
}
