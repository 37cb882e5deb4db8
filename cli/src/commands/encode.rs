//! Encode command implementation.

use super::read_text;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokenmill_tokenizer::{EncodeOptions, Tokenizer};

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the tokenizer artifact
    pub vocab: PathBuf,

    /// Text to encode (`-` reads stdin)
    pub text: String,

    /// Wrap the output in <bos> ... <eos>
    #[arg(long)]
    pub bos_eos: bool,

    /// Emit a token for each whitespace run
    #[arg(long)]
    pub keep_whitespace: bool,
}

pub fn run(cmd: EncodeCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.vocab)
        .with_context(|| format!("Failed to load tokenizer {}", cmd.vocab.display()))?;
    let text = read_text(cmd.text)?;

    let encoding = tokenizer.encode(
        &text,
        EncodeOptions {
            add_boundary_markers: cmd.bos_eos,
            keep_whitespace: cmd.keep_whitespace,
        },
    );
    log::debug!("Encoded {} tokens: {:?}", encoding.len(), encoding.tokens);

    let ids: Vec<String> = encoding.ids.iter().map(|id| id.to_string()).collect();
    println!("{}", ids.join(" "));

    Ok(())
}
