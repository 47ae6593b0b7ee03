//! Document identity, version stamps and snapshots.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Stable identity of an open document.
///
/// The host allocates ids; the pipeline only registers them on open and
/// forgets them on close.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u32);

impl DocumentId {
    /// Create a new DocumentId from a raw index.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw index.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// Monotonic version stamp attached to every snapshot of a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentVersion(u64);

impl DocumentVersion {
    pub const INITIAL: DocumentVersion = DocumentVersion(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The version following this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Three-way comparison of two version stamps.
    pub fn compare(a: DocumentVersion, b: DocumentVersion) -> Ordering {
        a.cmp(&b)
    }
}

impl fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Immutable text of one version of a document.
///
/// Cloning is cheap: the text is shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSnapshot {
    text: Arc<str>,
    version: DocumentVersion,
}

impl DocumentSnapshot {
    pub fn new(text: impl Into<Arc<str>>, version: DocumentVersion) -> Self {
        Self {
            text: text.into(),
            version,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    pub fn version(&self) -> DocumentVersion {
        self.version
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
