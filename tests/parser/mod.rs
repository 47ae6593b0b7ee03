//! Parser tests
//!
//! Tests for:
//! - Lossless trees for well-formed and malformed documents
//! - Diagnostics for malformed markup
//! - Resuming a cursor from checkpoints across edit sequences

pub mod tests_cursor_reuse;
pub mod tests_error_recovery;
