//! Character-fed XML parser built for incremental reuse
//!
//! This module provides a lossless XML parser whose tokenizer can be paused
//! and resumed at any character:
//! - **XmlCursor** consumes one `char` at a time and records completed tokens
//! - **rowan** holds the CST (Concrete Syntax Tree)
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓ push(char)
//! XmlCursor → token log (+ checkpoints taken by the caller)
//!     ↓ end_of_input()
//! Tree builder → GreenNode tree (immutable, cheap to clone)
//!     ↓
//! AST layer → Typed wrappers over SyntaxNode
//!     ↓
//! HIR → Project model
//! ```
//!
//! ## Incremental Reparsing
//!
//! When text changes, the caller:
//! 1. Finds the first offset at which old and new text differ
//! 2. Restores the last checkpoint at or before that offset
//! 3. Feeds only the text from the checkpoint onwards

pub mod ast;
mod cursor;
pub mod errors;
mod syntax_kind;
mod token_log;
mod tree;

pub use ast::{AstNode, XmlAttribute, XmlDocument, XmlElement};
pub use cursor::{Checkpoint, CursorContext, LexState, Token, XmlCursor};
pub use errors::{Diagnostic, ErrorCode, RelatedInfo, Severity};
pub use syntax_kind::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, XmlLanguage};
pub use token_log::TokenLog;
pub use tree::{XmlParse, parse};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};
