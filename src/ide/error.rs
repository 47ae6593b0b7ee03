//! Errors reported by the host's query methods

use thiserror::Error;

use crate::base::DocumentId;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("document {0} is not open")]
    UnknownDocument(DocumentId),
    #[error("failed to build worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
