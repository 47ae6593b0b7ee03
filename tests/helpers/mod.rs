//! Shared helpers for integration tests

pub mod pipeline_helpers;
pub mod source_fixtures;
