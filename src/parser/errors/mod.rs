//! Diagnostics produced by the tokenizer, the tree builder and the project model
//!
//! - Categorized error codes for filtering and documentation
//! - Severity levels
//! - Related span tracking (e.g., "opened here" for unclosed elements)

mod codes;
mod error;

pub use codes::ErrorCode;
pub use error::{Diagnostic, RelatedInfo, Severity};
