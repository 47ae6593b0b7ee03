//! Syntactic stage options

/// Tuning knobs for the syntactic stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxOptions {
    /// Resume from the previous parse's checkpoints when the prefix matches
    pub incremental_reuse: bool,
    /// Bytes between recorded checkpoints
    pub checkpoint_interval: usize,
    /// Characters fed between cancellation checks
    pub cancellation_poll_interval: usize,
}

impl Default for SyntaxOptions {
    fn default() -> Self {
        Self {
            incremental_reuse: true,
            checkpoint_interval: 256,
            cancellation_poll_interval: 64,
        }
    }
}
