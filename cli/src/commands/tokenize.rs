//! Tokenize command implementation.

use super::read_text;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokenmill_tokenizer::Tokenizer;

/// Tokenize command arguments.
#[derive(Parser)]
pub struct TokenizeCommand {
    /// Path to the tokenizer artifact
    pub vocab: PathBuf,

    /// Text to split (`-` reads stdin)
    pub text: String,
}

pub fn run(cmd: TokenizeCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.vocab)
        .with_context(|| format!("Failed to load tokenizer {}", cmd.vocab.display()))?;
    let text = read_text(cmd.text)?;

    let pieces: Vec<String> = tokenizer
        .tokenize(&text)
        .into_iter()
        .map(|piece| format!("{:?}", piece))
        .collect();
    println!("{}", pieces.join(" "));

    Ok(())
}
