//! Piece interning and the word-start convention.
//!
//! Merge rules are keyed by pairs of piece handles rather than by strings.
//! A [`PieceTable`] hands out a stable `u32` handle for every distinct piece
//! string it sees. Handles are local to one table and unrelated to
//! vocabulary ids.

use ahash::AHashMap;
use compact_str::CompactString;

/// Marker prefixed to the first code point of every word.
pub const WORD_START: char = '\u{2581}';

/// Handle of an interned piece.
pub type PieceId = u32;

/// Split a word into its initial pieces.
///
/// The first code point carries the [`WORD_START`] marker; every other code
/// point is a piece of its own. An empty word has no pieces.
pub fn word_pieces(word: &str) -> Vec<CompactString> {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return Vec::new();
    };

    let mut pieces = Vec::with_capacity(word.len());
    let mut head = CompactString::default();
    head.push(WORD_START);
    head.push(first);
    pieces.push(head);

    let mut buf = [0u8; 4];
    pieces.extend(chars.map(|c| CompactString::new(c.encode_utf8(&mut buf))));
    pieces
}

/// Strip the [`WORD_START`] marker from a piece, if present.
#[inline]
pub fn strip_word_start(piece: &str) -> &str {
    piece.strip_prefix(WORD_START).unwrap_or(piece)
}

/// Interner mapping piece strings to dense handles.
#[derive(Debug, Clone, Default)]
pub struct PieceTable {
    pieces: Vec<CompactString>,
    index: AHashMap<CompactString, PieceId>,
}

impl PieceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a piece, returning its handle.
    pub fn intern(&mut self, piece: &str) -> PieceId {
        if let Some(&id) = self.index.get(piece) {
            return id;
        }

        let id = self.pieces.len() as PieceId;
        let piece = CompactString::new(piece);
        self.pieces.push(piece.clone());
        self.index.insert(piece, id);
        id
    }

    /// Handle of an already-interned piece.
    #[inline]
    pub fn get(&self, piece: &str) -> Option<PieceId> {
        self.index.get(piece).copied()
    }

    /// String for a handle.
    ///
    /// # Panics
    /// If `id` was not produced by this table.
    #[inline]
    pub fn resolve(&self, id: PieceId) -> &str {
        self.pieces[id as usize].as_str()
    }

    /// Number of interned pieces.
    #[inline]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Check if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}
