//! Line/column spans attached to diagnostics.
//!
//! Offsets inside the pipeline are byte-based [`TextRange`]s; spans are only
//! produced at the edges, when a consumer needs editor coordinates.

use super::{LineIndex, TextRange};

/// A range in source code (0-indexed, end exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// A position in source code (0-indexed, column counted in bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Convert a byte range into a line/column span.
    pub fn from_range(range: TextRange, index: &LineIndex) -> Self {
        let start = index.line_col(range.start());
        let end = index.line_col(range.end());
        Self {
            start: Position::new(start.line, start.col),
            end: Position::new(end.line, end.col),
        }
    }

    /// Check if a position falls within this span
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }
}
