//! Pipeline coordinator: the API editors talk to.
//!
//! [`AnalysisHost`] owns one Stage A worker and one Stage B worker per open
//! document, wires Stage B to Stage A's published results, and answers
//! queries without ever blocking on parse work.
//!
//! ## Usage
//!
//! ```no_run
//! use msbuild::base::{DocumentId, DocumentSnapshot, DocumentVersion};
//! use msbuild::ide::AnalysisHost;
//!
//! # fn main() -> Result<(), msbuild::ide::AnalysisError> {
//! let host = AnalysisHost::new()?;
//! let id = DocumentId::new(1);
//! host.open(id, DocumentSnapshot::new("<Project />", DocumentVersion::new(1)));
//!
//! // Blocking wait for the newest model; async callers can `.await` instead.
//! if let Some(result) = host.try_get_semantic(id)?.wait() {
//!     println!("{} diagnostics", result.output.diagnostics().len());
//! }
//! # Ok(())
//! # }
//! ```

mod analysis;
mod config;
mod error;

pub use analysis::{AnalysisHost, SemanticHandle, SyntaxHandle};
pub use config::AnalysisConfig;
pub use error::AnalysisError;

#[cfg(test)]
mod tests;
