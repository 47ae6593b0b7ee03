//! Malformed documents: trees stay lossless and errors are reported.

use rstest::rstest;

use msbuild::parser::{ErrorCode, SyntaxKind, parse};

#[rstest]
#[case::unterminated_comment("<Project><!-- open</Project>", ErrorCode::E0103)]
#[case::unterminated_cdata("<Project><![CDATA[x</Project>", ErrorCode::E0104)]
#[case::unterminated_value("<Project Sdk=\"X></Project>", ErrorCode::E0102)]
#[case::unquoted_value("<Project Sdk=X></Project>", ErrorCode::E0106)]
#[case::attribute_without_value("<Project Sdk></Project>", ErrorCode::E0107)]
#[case::unclosed_element("<Project><Target></Project>", ErrorCode::E0202)]
#[case::unmatched_end_tag("<Project></Target></Project>", ErrorCode::E0203)]
#[case::two_roots("<Project/><Project/>", ErrorCode::E0204)]
#[case::text_outside_root("<Project/>text", ErrorCode::E0205)]
#[case::empty_document("", ErrorCode::E0206)]
fn test_malformed_documents(#[case] text: &str, #[case] code: ErrorCode) {
    let parse = parse(text);

    assert_eq!(parse.syntax().text().to_string(), text);
    assert!(
        parse.diagnostics.iter().any(|d| d.code == code),
        "expected {code} in {:?}",
        parse.diagnostics
    );
    assert!(!parse.ok());
}

#[test]
fn test_diagnostic_ranges_are_within_text() {
    let text = "<Project>\n  <Target Name=\"A\">\n  <Message Text='x\n</Project>";
    let parse = parse(text);

    assert!(!parse.diagnostics.is_empty());
    for diagnostic in &parse.diagnostics {
        assert!(usize::from(diagnostic.range.end()) <= text.len(), "{diagnostic}");
    }
}

#[test]
fn test_unclosed_element_reports_where_it_opened() {
    let text = "<Project><Target></Project>";
    let parse = parse(text);

    let diagnostic = parse
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::E0202)
        .unwrap();
    let opened = diagnostic.related[0].range;
    assert_eq!(&text[opened], "Target");
}

#[test]
fn test_stray_end_tag_is_kept_in_error_node() {
    let parse = parse("<Project></Target></Project>");
    let error = parse
        .syntax()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::ERROR_NODE)
        .unwrap();
    assert_eq!(error.text().to_string(), "</Target>");
}
