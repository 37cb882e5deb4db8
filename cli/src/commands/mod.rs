//! CLI commands for the tokenmill tokenizer.

pub mod decode;
pub mod encode;
pub mod info;
pub mod tokenize;
pub mod train;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use info::InfoCommand;
pub use tokenize::TokenizeCommand;
pub use train::TrainCommand;

use anyhow::{Context, Result};
use std::io::Read;

/// Read the text argument, or stdin when it is `-`.
pub(crate) fn read_text(text: String) -> Result<String> {
    if text != "-" {
        return Ok(text);
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read text from stdin")?;
    Ok(buffer)
}
