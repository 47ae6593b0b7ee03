//! Chains of edits parsed incrementally must match parsing from scratch.

use rstest::rstest;
use tokio_util::sync::CancellationToken;

use msbuild::base::{DocumentSnapshot, DocumentVersion};
use msbuild::parser::parse;
use msbuild::syntax::{SyntacticStage, SyntaxOptions, SyntaxOutput};

use crate::helpers::source_fixtures::{LEGACY_PROJECT, SDK_PROJECT};

/// Parse each text in turn, feeding the previous output back in.
fn parse_chain(texts: &[String], interval: usize) -> Vec<SyntaxOutput> {
    let stage = SyntacticStage::new(SyntaxOptions {
        checkpoint_interval: interval,
        ..SyntaxOptions::default()
    });
    let cancel = CancellationToken::new();
    let mut outputs: Vec<SyntaxOutput> = Vec::new();
    for (version, text) in texts.iter().enumerate() {
        let snapshot = DocumentSnapshot::new(text.as_str(), DocumentVersion::new(version as u64));
        let output = stage.parse(&snapshot, outputs.last(), &cancel).unwrap();
        outputs.push(output);
    }
    outputs
}

/// Delete `text` one character at a time from the end.
fn backspacing(text: &str) -> Vec<String> {
    let mut texts = vec![text.to_string()];
    let mut current = text.to_string();
    while current.pop().is_some() {
        texts.push(current.clone());
    }
    texts
}

/// Insert `insertion` at `at`, one character at a time.
fn inserting(text: &str, at: usize, insertion: &str) -> Vec<String> {
    let mut texts = vec![text.to_string()];
    for (i, c) in insertion.char_indices() {
        let mut next = text.to_string();
        next.insert_str(at, &insertion[..i + c.len_utf8()]);
        texts.push(next);
    }
    texts
}

#[rstest]
#[case::backspace_sdk(backspacing(&SDK_PROJECT[..200]))]
#[case::insert_property(inserting(
    SDK_PROJECT,
    SDK_PROJECT.find("<Nullable>").unwrap(),
    "<LangVersion>latest</LangVersion>\n    "
))]
#[case::insert_comment_then_close(inserting(
    LEGACY_PROJECT,
    LEGACY_PROJECT.find("<ItemGroup>").unwrap(),
    "<!-- disabled <ItemGroup/> -->"
))]
#[case::insert_non_ascii(inserting(
    SDK_PROJECT,
    SDK_PROJECT.find("Exe").unwrap(),
    "Ünïcødé€"
))]
fn test_edit_chain_matches_scratch(
    #[case] texts: Vec<String>,
    #[values(1, 7, 64)] interval: usize,
) {
    let outputs = parse_chain(&texts, interval);

    for (text, output) in texts.iter().zip(&outputs) {
        let scratch = parse(text);
        assert_eq!(output.green(), &scratch.green, "text: {text:?}");
        assert_eq!(output.diagnostics(), scratch.diagnostics.as_slice());
        assert_eq!(output.tokens(), &scratch.tokens);
    }
}

#[test]
fn test_later_edits_reuse_more_prefix() {
    let texts = inserting(SDK_PROJECT, SDK_PROJECT.len() - "</Project>\n".len(), "<Import Project=\"x\" />");
    let outputs = parse_chain(&texts, 16);

    // Every incremental parse after the first resumes well past the start.
    for output in &outputs[1..] {
        assert!(usize::from(output.reused_offset()) > SDK_PROJECT.len() / 2);
    }
}
