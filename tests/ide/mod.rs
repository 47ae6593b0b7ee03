//! Pipeline tests
//!
//! Tests for:
//! - Document lifecycle through `AnalysisHost`
//! - Supersession and coalescing across Stage A and Stage B
//! - Monotonic delivery to subscribers
//! - Incremental reuse under simulated typing

pub mod tests_pipeline;
pub mod tests_supersession;
