//! Diagnostic type shared by all stages

use std::fmt;

use rowan::{TextRange, TextSize};

use super::codes::ErrorCode;
use crate::base::{LineIndex, Span};

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Hint,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Hint => "hint",
        }
    }
}

/// Related location information for a diagnostic
///
/// E.g. "element opened here" pointing at the start tag of an unclosed element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub message: String,
    pub range: TextRange,
}

impl RelatedInfo {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }

    pub fn span(&self, index: &LineIndex) -> Span {
        Span::from_range(self.range, index)
    }
}

/// A diagnostic with location, code and severity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable message
    pub message: String,
    /// Source location (byte offsets)
    pub range: TextRange,
    pub code: ErrorCode,
    pub severity: Severity,
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
            code,
            severity: Severity::Error,
            related: vec![],
        }
    }

    /// Create a warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>, range: TextRange) -> Self {
        Self::error(code, message, range).with_severity(Severity::Warning)
    }

    /// Create an error at a specific offset with zero-width range
    pub fn at_offset(code: ErrorCode, message: impl Into<String>, offset: TextSize) -> Self {
        Self::error(code, message, TextRange::empty(offset))
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    /// Line/column span of the diagnostic for editor-facing consumers.
    pub fn span(&self, index: &LineIndex) -> Span {
        Span::from_range(self.range, index)
    }

    /// Move the diagnostic (and its related locations) by `delta` bytes.
    pub fn shifted(mut self, delta: TextSize) -> Self {
        self.range += delta;
        for info in &mut self.related {
            info.range += delta;
        }
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.severity.as_str(),
            self.code,
            self.message
        )
    }
}
