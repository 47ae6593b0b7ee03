//! End-to-end tests for the two-stage pipeline.

use std::sync::mpsc;

use rstest::rstest;

use msbuild::base::{DocumentId, DocumentVersion, TextSize};
use msbuild::hir::{BuiltinSchema, ProjectModelBuilder, SchemaProvider};
use msbuild::ide::AnalysisConfig;
use msbuild::parser::{self, CursorContext};

use crate::helpers::pipeline_helpers::*;
use crate::helpers::source_fixtures::{LEGACY_PROJECT, SDK_PROJECT};

// =============================================================================
// HELPERS
// =============================================================================

/// Every prefix of `text`, as an editor would send while typing it.
fn typing(text: &str) -> Vec<&str> {
    text.char_indices()
        .map(|(i, c)| &text[..i + c.len_utf8()])
        .collect()
}

// =============================================================================
// LIFECYCLE
// =============================================================================

#[rstest]
#[case::sdk(SDK_PROJECT)]
#[case::legacy(LEGACY_PROJECT)]
fn test_open_builds_model(#[case] text: &str) {
    let host = host();
    let id = DocumentId::new(1);
    host.open(id, snapshot(text, 1));

    let semantic = host.try_get_semantic(id).unwrap().wait().unwrap();
    assert!(semantic.output.diagnostics().is_empty(), "{:?}", semantic.output.diagnostics());

    let syntax = host.last_syntax(id).unwrap().unwrap();
    assert!(!syntax.output.has_errors(), "{:?}", syntax.output.diagnostics());
    assert_eq!(syntax.output.syntax().text().to_string(), text);
    // Stage B was built from the Stage A result it reports.
    assert_eq!(semantic.source.version(), syntax.version());
}

#[test]
fn test_documents_are_independent() {
    let host = host();
    let ids: Vec<_> = (1..=8).map(DocumentId::new).collect();
    for id in &ids {
        let text = format!("<Project><Target Name=\"T{}\"/></Project>", id.index());
        host.open(*id, snapshot(&text, 1));
    }
    host.closed(ids[0]);

    for id in &ids[1..] {
        let model = host.try_get_semantic(*id).unwrap().wait().unwrap();
        let name = format!("T{}", id.index());
        assert!(model.output.target(&name).is_some());
        assert_eq!(model.output.targets().count(), 1);
    }
    assert_eq!(host.document_count(), 7);
}

// =============================================================================
// TYPING
// =============================================================================

#[rstest]
fn test_typing_converges_to_scratch_parse(
    #[values(true, false)] incremental_reuse: bool,
    #[values(1, 16, 256)] checkpoint_interval: usize,
) {
    let host = host_with(
        AnalysisConfig::default()
            .with_worker_threads(2)
            .with_incremental_reuse(incremental_reuse)
            .with_checkpoint_interval(checkpoint_interval)
            .with_cancellation_poll_interval(4),
    );
    let id = DocumentId::new(1);
    let prefixes = typing(SDK_PROJECT);
    host.open(id, snapshot(prefixes[0], 1));
    for (version, text) in prefixes.iter().enumerate().skip(1) {
        host.changed(id, snapshot(text, version as u64 + 1));
    }
    let last = prefixes.len() as u64;

    let semantic = host.try_get_semantic(id).unwrap().wait().unwrap();
    assert_eq!(semantic.version(), DocumentVersion::new(last));

    let syntax = host.last_syntax(id).unwrap().unwrap();
    assert_eq!(syntax.version(), DocumentVersion::new(last));
    let scratch = parser::parse(SDK_PROJECT);
    assert_eq!(syntax.output.green(), &scratch.green);
    assert_eq!(syntax.output.diagnostics(), scratch.diagnostics.as_slice());

    let schema = BuiltinSchema::new().schema().unwrap();
    let expected = ProjectModelBuilder::new(&schema)
        .build(&scratch.syntax(), None, &Default::default())
        .unwrap();
    assert_eq!(
        semantic.output.properties().collect::<Vec<_>>(),
        expected.properties().collect::<Vec<_>>()
    );
    assert_eq!(semantic.output.items(), expected.items());
    assert_eq!(semantic.output.diagnostics(), expected.diagnostics());
}

#[test]
fn test_subscribers_observe_increasing_versions_while_typing() {
    let host = host();
    let id = DocumentId::new(1);
    host.open(id, snapshot("", 1));

    let (syntax_tx, syntax_rx) = mpsc::channel();
    let (semantic_tx, semantic_rx) = mpsc::channel();
    host.subscribe_syntax(id, move |result| {
        let _ = syntax_tx.send(result.version().get());
    })
    .unwrap();
    host.subscribe_semantic(id, move |result| {
        let _ = semantic_tx.send(result.version().get());
    })
    .unwrap();

    let prefixes = typing(LEGACY_PROJECT);
    for (index, text) in prefixes.iter().enumerate() {
        host.changed(id, snapshot(text, index as u64 + 2));
    }
    let last = prefixes.len() as u64 + 1;

    let syntax_versions = versions_until(&syntax_rx, last);
    let semantic_versions = versions_until(&semantic_rx, last);
    assert_strictly_increasing(&syntax_versions);
    assert_strictly_increasing(&semantic_versions);
    // Stage B only ever sees versions Stage A published.
    assert!(
        semantic_versions
            .iter()
            .all(|v| syntax_versions.contains(v) || *v == 1),
        "{semantic_versions:?} not within {syntax_versions:?}"
    );
}

// =============================================================================
// CURSOR
// =============================================================================

#[test]
fn test_cursor_at_while_editing() {
    let host = host();
    let id = DocumentId::new(1);
    host.open(id, snapshot(SDK_PROJECT, 1));
    host.try_get_syntax(id).unwrap().wait().unwrap();

    // The caret is in a property the published tree has never seen.
    let edited = SDK_PROJECT.replace("<Nullable>", "<LangVersion>lat</LangVersion>\n    <Nullable>");
    let offset = edited.find("lat<").unwrap() + 3;
    let cursor = host
        .cursor_at(id, TextSize::try_from(offset).unwrap(), &edited)
        .unwrap();

    assert_eq!(
        cursor.context(),
        CursorContext::Content {
            element: Some("LangVersion".into())
        }
    );
    assert_eq!(
        cursor.element_path(),
        &["Project", "PropertyGroup", "LangVersion"]
    );
}
