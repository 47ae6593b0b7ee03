//! AnalysisHost: per-document pipeline state.
//!
//! The host keeps a single arena of open documents. Each entry holds the
//! Stage A worker, the Stage B worker and the subscription that forwards
//! Stage A results into Stage B:
//!
//! ```text
//! changed(id, snapshot)
//!     │
//!     ▼
//! Stage A worker ──publish──▶ subscription ──submit──▶ Stage B worker ──publish──▶ consumers
//! ```
//!
//! Worker handles are cloned out of the arena before they are used, so no
//! worker call (and no subscriber callback) runs under the arena lock.

use std::sync::Arc;

use parking_lot::Mutex;
use rayon::ThreadPool;
use rowan::TextSize;
use rustc_hash::FxHashMap;
use tracing::{debug, error, warn};

use super::config::AnalysisConfig;
use super::error::AnalysisError;
use crate::base::{DocumentId, DocumentSnapshot};
use crate::hir::{BuiltinSchema, ProjectModel, SchemaProvider, SemanticResult, SemanticStage};
use crate::parser::XmlCursor;
use crate::syntax::{SyntacticStage, SyntaxOutput, SyntaxResult};
use crate::worker::{ParseOperation, ResultHandle, SubscriptionId, Worker, panic_message};

type SyntaxWorker = Worker<DocumentSnapshot, SyntaxOutput>;
type SemanticWorker = Worker<SyntaxResult, ProjectModel>;

/// Handle resolving to a Stage A result
pub type SyntaxHandle = ResultHandle<DocumentSnapshot, SyntaxOutput>;
/// Handle resolving to a Stage B result
pub type SemanticHandle = ResultHandle<SyntaxResult, ProjectModel>;

struct DocumentEntry {
    syntax: SyntaxWorker,
    semantic: SemanticWorker,
    /// Stage B's subscription on Stage A
    subscription: SubscriptionId,
}

impl DocumentEntry {
    fn dispose(&self) {
        self.syntax.unsubscribe(self.subscription);
        self.syntax.dispose();
        self.semantic.dispose();
    }
}

/// Owns the background parsing pipeline for every open document.
///
/// All methods take `&self`; the host can be shared across threads.
pub struct AnalysisHost {
    config: AnalysisConfig,
    pool: Arc<ThreadPool>,
    syntax_stage: Arc<dyn ParseOperation<DocumentSnapshot, SyntaxOutput>>,
    semantic_stage: Arc<dyn ParseOperation<SyntaxResult, ProjectModel>>,
    documents: Mutex<FxHashMap<DocumentId, DocumentEntry>>,
}

impl AnalysisHost {
    /// Create a host with the default configuration and built-in schema.
    pub fn new() -> Result<Self, AnalysisError> {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        Self::with_schema(config, Arc::new(BuiltinSchema::new()))
    }

    /// Create a host whose semantic stage takes its schema from `schema`.
    pub fn with_schema(
        config: AnalysisConfig,
        schema: Arc<dyn SchemaProvider>,
    ) -> Result<Self, AnalysisError> {
        // A task that unwinds past the worker would otherwise abort the process.
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|index| format!("msbuild-worker-{index}"))
            .panic_handler(|payload| {
                error!(panic = panic_message(payload.as_ref()), "pipeline task panicked");
            });
        if let Some(threads) = config.worker_threads {
            builder = builder.num_threads(threads);
        }
        let pool = Arc::new(builder.build()?);

        Ok(Self {
            syntax_stage: Arc::new(SyntacticStage::new(config.syntax_options())),
            semantic_stage: Arc::new(SemanticStage::new(schema)),
            config,
            pool,
            documents: Mutex::new(FxHashMap::default()),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    // =========================================================================
    // Document lifecycle
    // =========================================================================

    /// Start tracking `id` and parse its first snapshot. Re-opening an open
    /// document discards its previous pipeline.
    pub fn open(&self, id: DocumentId, snapshot: DocumentSnapshot) {
        let syntax = Worker::new(
            id,
            "syntax",
            Arc::clone(&self.syntax_stage),
            Arc::clone(&self.pool),
        );
        let semantic = Worker::new(
            id,
            "semantic",
            Arc::clone(&self.semantic_stage),
            Arc::clone(&self.pool),
        );
        let downstream = semantic.clone();
        let subscription = syntax.subscribe(move |result: &SyntaxResult| {
            downstream.submit(Arc::clone(result));
        });

        let version = snapshot.version();
        let replaced = self.documents.lock().insert(
            id,
            DocumentEntry {
                syntax: syntax.clone(),
                semantic,
                subscription,
            },
        );
        if let Some(replaced) = replaced {
            debug!(document = %id, "document re-opened, previous pipeline disposed");
            replaced.dispose();
        }

        debug!(document = %id, %version, "document opened");
        syntax.submit(snapshot);
    }

    /// Offer a new snapshot of an open document. Unknown documents are
    /// ignored.
    pub fn changed(&self, id: DocumentId, snapshot: DocumentSnapshot) {
        match self.syntax_worker(id) {
            Ok(syntax) => syntax.submit(snapshot),
            Err(_) => {
                warn!(document = %id, version = %snapshot.version(), "change for a document that is not open");
            }
        }
    }

    /// Stop tracking `id`, cancelling its in-flight work.
    pub fn closed(&self, id: DocumentId) {
        let removed = self.documents.lock().remove(&id);
        match removed {
            Some(entry) => {
                entry.dispose();
                debug!(document = %id, "document closed");
            }
            None => debug!(document = %id, "close for a document that is not open"),
        }
    }

    pub fn is_open(&self, id: DocumentId) -> bool {
        self.documents.lock().contains_key(&id)
    }

    pub fn document_count(&self) -> usize {
        self.documents.lock().len()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Handle for the Stage A result of the newest snapshot offered.
    pub fn try_get_syntax(&self, id: DocumentId) -> Result<SyntaxHandle, AnalysisError> {
        Ok(self.syntax_worker(id)?.current_or_in_flight())
    }

    /// Handle for the Stage B result built from the newest snapshot Stage A
    /// knows about, or anything newer.
    pub fn try_get_semantic(&self, id: DocumentId) -> Result<SemanticHandle, AnalysisError> {
        let (syntax, semantic) = self.workers(id)?;
        Ok(match syntax.latest_version() {
            Some(version) => semantic.wait_for(version),
            None => semantic.current_or_in_flight(),
        })
    }

    /// Last published Stage A result; never waits.
    pub fn last_syntax(&self, id: DocumentId) -> Result<Option<SyntaxResult>, AnalysisError> {
        Ok(self.syntax_worker(id)?.last_output())
    }

    /// Last published Stage B result; never waits.
    pub fn last_semantic(&self, id: DocumentId) -> Result<Option<SemanticResult>, AnalysisError> {
        Ok(self.workers(id)?.1.last_output())
    }

    /// A cursor at `offset` of `text`, resumed from the last syntax result
    /// where its checkpoints are still valid.
    pub fn cursor_at(
        &self,
        id: DocumentId,
        offset: TextSize,
        text: &str,
    ) -> Result<XmlCursor, AnalysisError> {
        let last = self.syntax_worker(id)?.last_output();
        Ok(SyntacticStage::cursor_at(
            last.as_ref().map(|result| &result.output),
            offset,
            text,
        ))
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Call `callback` with every Stage A result of `id`, starting with the
    /// current one if it exists.
    pub fn subscribe_syntax<F>(
        &self,
        id: DocumentId,
        callback: F,
    ) -> Result<SubscriptionId, AnalysisError>
    where
        F: Fn(&SyntaxResult) + Send + Sync + 'static,
    {
        Ok(self.syntax_worker(id)?.subscribe(callback))
    }

    /// Call `callback` with every Stage B result of `id`, starting with the
    /// current one if it exists.
    pub fn subscribe_semantic<F>(
        &self,
        id: DocumentId,
        callback: F,
    ) -> Result<SubscriptionId, AnalysisError>
    where
        F: Fn(&SemanticResult) + Send + Sync + 'static,
    {
        Ok(self.workers(id)?.1.subscribe(callback))
    }

    pub fn unsubscribe_syntax(
        &self,
        id: DocumentId,
        subscription: SubscriptionId,
    ) -> Result<bool, AnalysisError> {
        Ok(self.syntax_worker(id)?.unsubscribe(subscription))
    }

    pub fn unsubscribe_semantic(
        &self,
        id: DocumentId,
        subscription: SubscriptionId,
    ) -> Result<bool, AnalysisError> {
        Ok(self.workers(id)?.1.unsubscribe(subscription))
    }

    // =========================================================================
    // Arena access
    // =========================================================================

    fn workers(&self, id: DocumentId) -> Result<(SyntaxWorker, SemanticWorker), AnalysisError> {
        self.documents
            .lock()
            .get(&id)
            .map(|entry| (entry.syntax.clone(), entry.semantic.clone()))
            .ok_or(AnalysisError::UnknownDocument(id))
    }

    fn syntax_worker(&self, id: DocumentId) -> Result<SyntaxWorker, AnalysisError> {
        self.documents
            .lock()
            .get(&id)
            .map(|entry| entry.syntax.clone())
            .ok_or(AnalysisError::UnknownDocument(id))
    }
}

impl Drop for AnalysisHost {
    fn drop(&mut self) {
        for (_, entry) in self.documents.get_mut().drain() {
            entry.dispose();
        }
    }
}
