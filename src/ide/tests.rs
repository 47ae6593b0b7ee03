#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use rowan::TextSize;

use super::*;
use crate::base::{DocumentId, DocumentSnapshot, DocumentVersion};
use crate::hir::{Schema, SchemaError, SchemaProvider};
use crate::parser::CursorContext;

const DOC: DocumentId = DocumentId::new(7);

fn host() -> AnalysisHost {
    AnalysisHost::with_config(AnalysisConfig::default().with_worker_threads(2)).unwrap()
}

fn snap(text: &str, version: u64) -> DocumentSnapshot {
    DocumentSnapshot::new(text, DocumentVersion::new(version))
}

#[test]
fn test_config_defaults_and_builders() {
    let config = AnalysisConfig::default();
    assert!(config.incremental_reuse);
    assert_eq!(config.checkpoint_interval, 256);
    assert_eq!(config.cancellation_poll_interval, 64);
    assert_eq!(config.worker_threads, None);

    let config = config
        .with_incremental_reuse(false)
        .with_checkpoint_interval(32)
        .with_cancellation_poll_interval(8);
    let options = config.syntax_options();
    assert!(!options.incremental_reuse);
    assert_eq!(options.checkpoint_interval, 32);
    assert_eq!(options.cancellation_poll_interval, 8);
}

#[test]
fn test_open_produces_syntax_and_semantic_results() {
    let host = host();
    host.open(DOC, snap("<Project Sdk=\"X\"><PropertyGroup><A>1</A></PropertyGroup></Project>", 1));

    let syntax = host.try_get_syntax(DOC).unwrap().wait().unwrap();
    assert_eq!(syntax.version(), DocumentVersion::new(1));
    assert!(!syntax.output.has_errors());

    let semantic = host.try_get_semantic(DOC).unwrap().wait().unwrap();
    assert_eq!(semantic.version(), DocumentVersion::new(1));
    assert_eq!(semantic.output.sdk(), Some("X"));
    assert_eq!(semantic.output.property("A").unwrap().value, "1");

    assert!(host.is_open(DOC));
    assert_eq!(host.document_count(), 1);
    assert!(host.last_syntax(DOC).unwrap().is_some());
}

#[test]
fn test_changed_supersedes_previous_snapshot() {
    let host = host();
    host.open(DOC, snap("<Project/>", 1));
    host.changed(DOC, snap("<Project><Target Name=\"Build\"/></Project>", 2));

    let semantic = host.try_get_semantic(DOC).unwrap().wait().unwrap();
    assert_eq!(semantic.version(), DocumentVersion::new(2));
    assert!(semantic.output.target("Build").is_some());
    assert_eq!(
        host.last_semantic(DOC).unwrap().unwrap().version(),
        DocumentVersion::new(2)
    );
}

#[test]
fn test_unknown_document_queries_fail() {
    let host = host();
    let unknown = DocumentId::new(99);

    assert!(matches!(
        host.try_get_syntax(unknown),
        Err(AnalysisError::UnknownDocument(id)) if id == unknown
    ));
    assert!(host.try_get_semantic(unknown).is_err());
    assert!(host.last_syntax(unknown).is_err());
    assert!(host.subscribe_semantic(unknown, |_| {}).is_err());
    assert!(host.cursor_at(unknown, TextSize::from(0), "").is_err());

    // Changes and closes for unknown documents are ignored.
    host.changed(unknown, snap("<Project/>", 1));
    host.closed(unknown);
    assert!(!host.is_open(unknown));
}

#[test]
fn test_closed_drops_document() {
    let host = host();
    host.open(DOC, snap("<Project/>", 1));
    host.try_get_semantic(DOC).unwrap().wait().unwrap();

    host.closed(DOC);
    assert!(!host.is_open(DOC));
    assert_eq!(host.document_count(), 0);
    assert!(matches!(
        host.last_semantic(DOC),
        Err(AnalysisError::UnknownDocument(_))
    ));
}

#[test]
fn test_reopen_starts_fresh_pipeline() {
    let host = host();
    host.open(DOC, snap("<Project><Target Name=\"Old\"/></Project>", 5));
    host.try_get_semantic(DOC).unwrap().wait().unwrap();

    host.open(DOC, snap("<Project><Target Name=\"New\"/></Project>", 1));
    let semantic = host.try_get_semantic(DOC).unwrap().wait().unwrap();

    assert_eq!(semantic.version(), DocumentVersion::new(1));
    assert!(semantic.output.target("New").is_some());
    assert_eq!(host.document_count(), 1);
}

#[test]
fn test_semantic_subscription_sees_final_version() {
    let host = host();
    host.open(DOC, snap("<Project/>", 1));
    let (tx, rx) = mpsc::channel();
    host.subscribe_semantic(DOC, move |result| {
        let _ = tx.send(result.version().get());
    })
    .unwrap();

    for version in 2..=10 {
        let text = format!("<Project><Target Name=\"T{version}\"/></Project>");
        host.changed(DOC, snap(&text, version));
    }

    let mut seen = Vec::new();
    while seen.last() != Some(&10) {
        seen.push(rx.recv_timeout(Duration::from_secs(5)).unwrap());
    }
    assert!(seen.windows(2).all(|w| w[0] < w[1]), "{seen:?}");
}

#[test]
fn test_panicking_consumer_does_not_stop_pipeline() {
    let host = host();
    host.open(DOC, snap("<Project/>", 1));
    host.try_get_semantic(DOC).unwrap().wait().unwrap();
    host.subscribe_syntax(DOC, |result| {
        if result.version().get() == 2 {
            panic!("consumer exploded");
        }
    })
    .unwrap();

    host.changed(DOC, snap("<Project><Target Name=\"A\"/></Project>", 2));
    host.changed(DOC, snap("<Project><Target Name=\"B\"/></Project>", 3));

    let semantic = host.try_get_semantic(DOC).unwrap().wait().unwrap();
    assert_eq!(semantic.version(), DocumentVersion::new(3));
    assert!(semantic.output.target("B").is_some());
}

#[test]
fn test_unsubscribe() {
    let host = host();
    host.open(DOC, snap("<Project/>", 1));
    let id = host.subscribe_syntax(DOC, |_| {}).unwrap();

    assert!(host.unsubscribe_syntax(DOC, id).unwrap());
    assert!(!host.unsubscribe_syntax(DOC, id).unwrap());
}

#[test]
fn test_cursor_at_uses_last_syntax_result() {
    let host = host();
    let text = "<Project><ItemGroup><Compile Include=\"a.cs\" /></ItemGroup></Project>";
    host.open(DOC, snap(text, 1));
    host.try_get_syntax(DOC).unwrap().wait().unwrap();

    let offset = text.find("a.cs").unwrap();
    let cursor = host
        .cursor_at(DOC, TextSize::try_from(offset).unwrap(), text)
        .unwrap();
    assert!(matches!(
        cursor.context(),
        CursorContext::AttributeValue { attribute: Some(ref name), .. } if name == "Include"
    ));
}

struct BrokenSchema;

impl SchemaProvider for BrokenSchema {
    fn schema(&self) -> Result<Arc<Schema>, SchemaError> {
        Err(SchemaError::NotLoaded("offline".into()))
    }
}

#[test]
fn test_unavailable_schema_publishes_empty_model() {
    let host = AnalysisHost::with_schema(
        AnalysisConfig::default().with_worker_threads(1),
        Arc::new(BrokenSchema),
    )
    .unwrap();
    host.open(DOC, snap("<Project><Target Name=\"A\"/></Project>", 1));

    let semantic = host.try_get_semantic(DOC).unwrap().wait().unwrap();
    assert!(semantic.output.is_fallback());
    assert!(semantic.output.target("A").is_none());
    // Stage A is unaffected.
    assert!(!host.last_syntax(DOC).unwrap().unwrap().output.is_fallback());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_handles_are_awaitable() {
    let host = host();
    host.open(DOC, snap("<Project Sdk=\"Async\"/>", 1));

    let semantic = host.try_get_semantic(DOC).unwrap().await.unwrap();
    assert_eq!(semantic.output.sdk(), Some("Async"));
}
