//! tokenmill CLI - Command-line interface for the BPE tokenizer.
//!
//! This is the main entry point for the `tokenmill` command-line tool.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use commands::{DecodeCommand, EncodeCommand, InfoCommand, TokenizeCommand, TrainCommand};
use env_logger::Env;
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "tokenmill")]
#[command(about = "A character-level BPE subword tokenizer", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new tokenizer from a text corpus
    Train(TrainCommand),
    /// Encode text to token IDs
    Encode(EncodeCommand),
    /// Decode token IDs back to text
    Decode(DecodeCommand),
    /// Split text into subword pieces
    Tokenize(TokenizeCommand),
    /// Summarize a trained tokenizer
    Info(InfoCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Train(cmd) => commands::train::run(cmd)?,
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
        Commands::Tokenize(cmd) => commands::tokenize::run(cmd)?,
        Commands::Info(cmd) => commands::info::run(cmd)?,
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: u8) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    if let Some(level) = level_override(verbose, quiet) {
        builder.filter_level(level);
    }
    if let Err(err) = builder.try_init() {
        eprintln!("Logging already initialized: {}", err);
    }
}

/// Level forced by `-v`/`-q`; `None` leaves `RUST_LOG` in charge.
fn level_override(verbose: u8, quiet: u8) -> Option<LevelFilter> {
    match (quiet, verbose) {
        (0, 0) => None,
        (0, 1) => Some(LevelFilter::Debug),
        (0, _) => Some(LevelFilter::Trace),
        (1, _) => Some(LevelFilter::Warn),
        _ => Some(LevelFilter::Error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_defers_to_env() {
        assert_eq!(level_override(0, 0), None);
    }

    #[test]
    fn test_flag_levels() {
        assert_eq!(level_override(1, 0), Some(LevelFilter::Debug));
        assert_eq!(level_override(3, 0), Some(LevelFilter::Trace));
        assert_eq!(level_override(0, 1), Some(LevelFilter::Warn));
        assert_eq!(level_override(0, 2), Some(LevelFilter::Error));
        // Quiet wins over verbose.
        assert_eq!(level_override(2, 1), Some(LevelFilter::Warn));
    }
}
