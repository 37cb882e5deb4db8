//! Decode command implementation.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokenmill_tokenizer::{DecodeOptions, Tokenizer};

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to the tokenizer artifact
    pub vocab: PathBuf,

    /// Token IDs to decode
    #[arg(required = true)]
    pub ids: Vec<u32>,

    /// Drop special tokens from the output
    #[arg(long)]
    pub skip_special: bool,
}

pub fn run(cmd: DecodeCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.vocab)
        .with_context(|| format!("Failed to load tokenizer {}", cmd.vocab.display()))?;

    let text = tokenizer.decode(
        &cmd.ids,
        DecodeOptions {
            skip_special_tokens: cmd.skip_special,
        },
    );
    println!("{}", text);

    Ok(())
}
