//! HIR layer tests
//!
//! Tests for the MSBuild project model:
//! - Properties, items, targets and imports from real-world projects
//! - Semantic diagnostics
//! - Section reuse across edits

pub mod tests_project_model;
