//! Info command implementation.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokenmill_tokenizer::Tokenizer;

/// Info command arguments.
#[derive(Parser)]
pub struct InfoCommand {
    /// Path to the tokenizer artifact
    pub vocab: PathBuf,

    /// Number of merges to list, in rank order
    #[arg(long, default_value_t = 10)]
    pub merges: usize,
}

pub fn run(cmd: InfoCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.vocab)
        .with_context(|| format!("Failed to load tokenizer {}", cmd.vocab.display()))?;

    let specials: Vec<&str> = tokenizer.vocab().specials().collect();
    println!("Vocab size: {}", tokenizer.vocab_size());
    println!("Merges: {}", tokenizer.merge_count());
    println!("Lowercase: {}", tokenizer.config().lowercase);
    println!("Special tokens: {}", specials.join(" "));

    if cmd.merges > 0 && tokenizer.merge_count() > 0 {
        println!();
        for (rank, (left, right)) in tokenizer.merges().take(cmd.merges).enumerate() {
            println!("{:>6}  {} + {}", rank, left, right);
        }
    }

    Ok(())
}
