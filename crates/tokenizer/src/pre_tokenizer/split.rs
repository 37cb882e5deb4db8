//! Text splitting for pre-tokenization.
//!
//! Training only needs the words of a text. Encoding also keeps the
//! whitespace runs between them so they can be mapped to whitespace tokens.

use regex::Regex;
use std::sync::OnceLock;

/// Alternating whitespace and non-whitespace runs.
const SEGMENT_PATTERN: &str = r"\s+|\S+";

/// A run of text produced by [`Splitter::segments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A whitespace-free word
    Word(&'a str),
    /// A maximal whitespace run
    Whitespace(&'a str),
}

impl<'a> Segment<'a> {
    /// The underlying text.
    pub fn as_str(&self) -> &'a str {
        match *self {
            Segment::Word(s) | Segment::Whitespace(s) => s,
        }
    }
}

/// Text splitter for pre-tokenization.
#[derive(Debug, Clone, Copy, Default)]
pub struct Splitter;

impl Splitter {
    /// Create a new splitter.
    pub fn new() -> Self {
        Self
    }

    /// Split text into lines, then lines into whitespace-delimited words.
    pub fn words<'a>(&self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        text.lines().flat_map(str::split_whitespace)
    }

    /// Split text into words and whitespace runs, preserving everything.
    pub fn segments<'a>(&self, text: &'a str) -> impl Iterator<Item = Segment<'a>> + 'a {
        segment_regex().find_iter(text).map(|m| {
            let s = m.as_str();
            if s.starts_with(char::is_whitespace) {
                Segment::Whitespace(s)
            } else {
                Segment::Word(s)
            }
        })
    }
}

fn segment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SEGMENT_PATTERN).expect("segment pattern is valid"))
}
