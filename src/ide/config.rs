//! Host configuration

use crate::syntax::SyntaxOptions;

/// Configuration for an [`AnalysisHost`](super::AnalysisHost)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Threads in the shared worker pool (`None` = one per core)
    pub worker_threads: Option<usize>,
    /// Resume syntactic parses from the previous result's checkpoints
    pub incremental_reuse: bool,
    /// Bytes between cursor checkpoints
    pub checkpoint_interval: usize,
    /// Characters fed between cancellation checks
    pub cancellation_poll_interval: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let syntax = SyntaxOptions::default();
        Self {
            worker_threads: None,
            incremental_reuse: syntax.incremental_reuse,
            checkpoint_interval: syntax.checkpoint_interval,
            cancellation_poll_interval: syntax.cancellation_poll_interval,
        }
    }
}

impl AnalysisConfig {
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn with_incremental_reuse(mut self, enabled: bool) -> Self {
        self.incremental_reuse = enabled;
        self
    }

    pub fn with_checkpoint_interval(mut self, bytes: usize) -> Self {
        self.checkpoint_interval = bytes;
        self
    }

    pub fn with_cancellation_poll_interval(mut self, chars: usize) -> Self {
        self.cancellation_poll_interval = chars;
        self
    }

    /// Options handed to the syntactic stage
    pub fn syntax_options(&self) -> SyntaxOptions {
        SyntaxOptions {
            incremental_reuse: self.incremental_reuse,
            checkpoint_interval: self.checkpoint_interval,
            cancellation_poll_interval: self.cancellation_poll_interval,
        }
    }
}
