//! Versioned inputs and the results produced from them.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::base::{DocumentSnapshot, DocumentVersion};

/// An input a worker can order by version.
pub trait VersionedInput: Clone + Send + Sync + 'static {
    fn version(&self) -> DocumentVersion;
}

/// Order two inputs by their version stamps.
pub fn compare_inputs<I: VersionedInput>(a: &I, b: &I) -> Ordering {
    DocumentVersion::compare(a.version(), b.version())
}

impl VersionedInput for DocumentSnapshot {
    fn version(&self) -> DocumentVersion {
        DocumentSnapshot::version(self)
    }
}

/// A published result: the stage output and the input that produced it.
#[derive(Debug)]
pub struct ParseResult<I, O> {
    pub output: O,
    pub source: I,
}

impl<I: VersionedInput, O> ParseResult<I, O> {
    pub fn version(&self) -> DocumentVersion {
        self.source.version()
    }
}

/// A published result is itself an input for the next stage.
impl<I, O> VersionedInput for Arc<ParseResult<I, O>>
where
    I: VersionedInput,
    O: Send + Sync + 'static,
{
    fn version(&self) -> DocumentVersion {
        self.source.version()
    }
}
