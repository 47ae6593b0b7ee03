//! # msbuild-base
//!
//! Incremental background parsing pipeline for MSBuild project documents.
//!
//! Every open document gets two versioned workers: Stage A turns snapshots
//! into XML syntax trees, Stage B turns those into a project model. Workers
//! run at most one operation at a time, keep only the newest pending input,
//! and publish results in version order.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → AnalysisHost: document lifecycle, Stage A → Stage B wiring
//!   ↓
//! hir       → Stage B: project model, property schema
//!   ↓
//! syntax    → Stage A: syntactic parse with cursor reuse
//!   ↓
//! worker    → Versioned worker: supersession, coalescing, subscriptions
//!   ↓
//! parser    → Character-fed XML cursor, rowan tree, diagnostics
//!   ↓
//! base      → Primitives (DocumentId, DocumentVersion, snapshots, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → worker → syntax → hir → ide)
// ============================================================================

/// Foundation types: document identity, versions, snapshots, text positions
pub mod base;

/// Parser: resumable XML cursor, rowan syntax tree, diagnostics
pub mod parser;

/// Versioned parser workers
pub mod worker;

/// Stage A: syntactic parsing with checkpoint reuse
pub mod syntax;

/// Stage B: MSBuild project model
pub mod hir;

/// Pipeline coordinator
pub mod ide;

// Re-export foundation types
pub use base::{
    DocumentId, DocumentSnapshot, DocumentVersion, LineCol, LineIndex, Position, Span, TextRange,
    TextSize,
};
pub use ide::{AnalysisConfig, AnalysisError, AnalysisHost};
