//! Stage A: the syntactic stage.
//!
//! Turns a [`DocumentSnapshot`](crate::base::DocumentSnapshot) into an XML
//! syntax tree plus diagnostics. Each output keeps the cursor checkpoints it
//! recorded, so the next parse of the same document can restore the cursor at
//! the last checkpoint before the first edited byte and feed only the rest.

mod options;
mod output;
mod stage;

pub use options::SyntaxOptions;
pub use output::SyntaxOutput;
pub use stage::{SyntacticStage, SyntaxResult};
