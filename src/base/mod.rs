//! Foundation types for the MSBuild toolchain.
//!
//! This module provides fundamental types used throughout the pipeline:
//! - [`DocumentId`] - Stable identity of an open document
//! - [`DocumentVersion`] - Monotonic version stamp of an edit
//! - [`DocumentSnapshot`] - Immutable text of one document version
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Position`], [`Span`] - Line/column ranges for diagnostics
//! - Text helpers (prefix diffing, XML name characters)
//!
//! This module has NO dependencies on other msbuild modules.

mod document;
mod line_index;
mod position;
pub mod text_utils;

pub use document::{DocumentId, DocumentSnapshot, DocumentVersion};
pub use line_index::{LineCol, LineIndex};
pub use position::{Position, Span};
pub use text_utils::first_differing_offset;

// Re-export text-size types for convenience
pub use text_size;
pub use text_size::{TextRange, TextSize};
