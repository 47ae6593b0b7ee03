//! Stage B supersession while it is busy.
//!
//! A schema provider that blocks on its first call keeps the semantic stage
//! mid-operation, so the tests control exactly when Stage B is busy.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use msbuild::base::{DocumentId, DocumentVersion};
use msbuild::hir::{BuiltinSchema, Schema, SchemaError, SchemaProvider};
use msbuild::ide::{AnalysisConfig, AnalysisHost};

use crate::helpers::pipeline_helpers::*;

// =============================================================================
// HELPERS
// =============================================================================

#[derive(Default)]
struct GatedSchema {
    inner: BuiltinSchema,
    released: Mutex<bool>,
    changed: Condvar,
    calls: AtomicUsize,
}

impl GatedSchema {
    fn release(&self) {
        *self.released.lock() = true;
        self.changed.notify_all();
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SchemaProvider for GatedSchema {
    fn schema(&self) -> Result<Arc<Schema>, SchemaError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            let mut released = self.released.lock();
            while !*released {
                self.changed.wait_for(&mut released, Duration::from_millis(10));
            }
        }
        self.inner.schema()
    }
}

fn gated_host() -> (AnalysisHost, Arc<GatedSchema>) {
    let schema = Arc::new(GatedSchema::default());
    let host = AnalysisHost::with_schema(
        AnalysisConfig::default().with_worker_threads(4),
        Arc::clone(&schema) as Arc<dyn SchemaProvider>,
    )
    .unwrap();
    (host, schema)
}

// =============================================================================
// TESTS
// =============================================================================

#[test]
fn test_busy_semantic_stage_skips_to_newest_tree() {
    let (host, schema) = gated_host();
    let id = DocumentId::new(1);
    let (tx, rx) = mpsc::channel();

    host.open(id, snapshot("<a><b/></a>", 1));
    host.subscribe_semantic(id, move |result| {
        let _ = tx.send(result.version().get());
    })
    .unwrap();
    // Stage B is now blocked inside its v1 operation.
    wait_until(|| schema.calls() == 1);

    // Stage B's forwarding subscription is notified before this one.
    let (syntax_tx, syntax_rx) = mpsc::channel();
    host.subscribe_syntax(id, move |result| {
        let _ = syntax_tx.send(result.version().get());
    })
    .unwrap();
    host.changed(id, snapshot("<a><b/><c/></a>", 2));
    versions_until(&syntax_rx, 2);
    schema.release();

    let semantic = host.try_get_semantic(id).unwrap().wait().unwrap();
    assert_eq!(semantic.version(), DocumentVersion::new(2));
    assert_eq!(
        semantic.source.output.syntax().text().to_string(),
        "<a><b/><c/></a>"
    );

    let versions = versions_until(&rx, 2);
    assert_strictly_increasing(&versions);
    // The in-flight v1 operation plus v2; nothing else was started.
    assert_eq!(schema.calls(), 2);
}

#[test]
fn test_burst_while_busy_runs_only_newest() {
    let (host, schema) = gated_host();
    let id = DocumentId::new(1);

    host.open(id, snapshot("<Project/>", 1));
    wait_until(|| schema.calls() == 1);

    let (syntax_tx, syntax_rx) = mpsc::channel();
    host.subscribe_syntax(id, move |result| {
        let _ = syntax_tx.send(result.version().get());
    })
    .unwrap();
    for version in 2..=20 {
        let text = format!("<Project><Target Name=\"T{version}\"/></Project>");
        host.changed(id, snapshot(&text, version));
    }
    versions_until(&syntax_rx, 20);
    schema.release();

    let semantic = host.try_get_semantic(id).unwrap().wait().unwrap();
    assert_eq!(semantic.version(), DocumentVersion::new(20));
    assert!(semantic.output.target("T20").is_some());
    assert_eq!(schema.calls(), 2);
}

#[test]
fn test_close_while_busy_resolves_handles_empty() {
    let (host, schema) = gated_host();
    let id = DocumentId::new(1);

    host.open(id, snapshot("<Project/>", 1));
    wait_until(|| schema.calls() == 1);
    let pending = host.try_get_semantic(id).unwrap();

    host.closed(id);
    assert!(pending.wait().is_none());
    assert!(!host.is_open(id));
    schema.release();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_awaiting_newest_model() {
    let (host, schema) = gated_host();
    let id = DocumentId::new(1);

    host.open(id, snapshot("<Project/>", 1));
    host.changed(id, snapshot("<Project Sdk=\"Final\"/>", 2));
    let handle = host.try_get_semantic(id).unwrap();
    schema.release();

    let semantic = handle.await.unwrap();
    assert_eq!(semantic.output.sdk(), Some("Final"));
}
