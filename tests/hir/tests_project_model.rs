//! Project model tests against realistic project files.

use rstest::rstest;
use tokio_util::sync::CancellationToken;

use msbuild::hir::{BuiltinSchema, ProjectModel, ProjectModelBuilder, SchemaProvider, ValueKind};
use msbuild::parser::{ErrorCode, Severity, parse};

use crate::helpers::source_fixtures::{LEGACY_PROJECT, SDK_PROJECT};

// =============================================================================
// HELPERS
// =============================================================================

fn build(text: &str, previous: Option<&ProjectModel>) -> ProjectModel {
    let schema = BuiltinSchema::new().schema().unwrap();
    ProjectModelBuilder::new(&schema)
        .build(&parse(text).syntax(), previous, &CancellationToken::new())
        .unwrap()
}

// =============================================================================
// EXTRACTION
// =============================================================================

#[test]
fn test_sdk_project() {
    let model = build(SDK_PROJECT, None);

    assert_eq!(model.sdk(), Some("Microsoft.NET.Sdk"));
    assert_eq!(model.property("OutputType").unwrap().value, "Exe");
    assert_eq!(
        model.property("TreatWarningsAsErrors").unwrap().kind,
        ValueKind::Bool
    );

    let packages: Vec<_> = model
        .items_of_type("PackageReference")
        .filter_map(|item| item.include.as_deref())
        .collect();
    assert_eq!(packages, vec!["Serilog", "Serilog.Sinks.Console"]);

    let reference = model.items_of_type("ProjectReference").next().unwrap();
    assert_eq!(reference.include.as_deref(), Some("..\\Core\\Core.csproj"));

    let target = model.target("PrintVersion").unwrap();
    assert_eq!(target.after, vec!["Build"]);
    assert_eq!(target.tasks, vec!["Message"]);
}

#[test]
fn test_legacy_project() {
    let model = build(LEGACY_PROJECT, None);

    assert_eq!(model.sdk(), None);
    assert!(model.diagnostics().is_empty(), "{:?}", model.diagnostics());

    let configuration = model.property("Configuration").unwrap();
    assert_eq!(configuration.value, "Debug");
    assert!(configuration.condition.as_deref().unwrap().contains("$(Configuration)"));

    assert_eq!(model.property("OutputPath").unwrap().kind, ValueKind::Path);
    assert_eq!(model.property("WarningLevel").unwrap().kind, ValueKind::Integer);
    assert_eq!(model.items_of_type("compile").count(), 2);

    let imports: Vec<_> = model.imports().iter().map(|i| i.project.as_str()).collect();
    assert_eq!(
        imports,
        vec![
            "$(MSBuildExtensionsPath)\\$(MSBuildToolsVersion)\\Microsoft.Common.props",
            "$(MSBuildToolsPath)\\Microsoft.CSharp.targets",
        ]
    );
}

// =============================================================================
// DIAGNOSTICS
// =============================================================================

#[rstest]
#[case::bool_property("Optimize", "fast", ErrorCode::E0306)]
#[case::version_property("AssemblyVersion", "one", ErrorCode::E0306)]
#[case::integer_property("FileAlignment", "1.2", ErrorCode::E0306)]
fn test_property_kind_warnings(
    #[case] name: &str,
    #[case] value: &str,
    #[case] code: ErrorCode,
) {
    let text = format!("<Project><PropertyGroup><{name}>{value}</{name}></PropertyGroup></Project>");
    let model = build(&text, None);

    let diagnostic = &model.diagnostics()[0];
    assert_eq!(diagnostic.code, code);
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert!(diagnostic.message.contains(name), "{}", diagnostic.message);
}

#[test]
fn test_syntax_errors_do_not_stop_model() {
    // The unclosed PropertyGroup still contributes its properties.
    let model = build("<Project><PropertyGroup><A>1</A></Project>", None);
    assert_eq!(model.property("A").unwrap().value, "1");
}

// =============================================================================
// REUSE
// =============================================================================

#[test]
fn test_reuse_across_successive_edits() {
    let mut previous = build(SDK_PROJECT, None);
    let edits = [
        SDK_PROJECT.replace("3.1.1", "3.2.0"),
        SDK_PROJECT.replace("3.1.1", "3.2.0").replace("net8.0", "net9.0"),
        SDK_PROJECT
            .replace("3.1.1", "3.2.0")
            .replace("net8.0", "net9.0")
            .replace("PrintVersion", "ShowVersion"),
    ];

    for text in &edits {
        let model = build(text, Some(&previous));
        let scratch = build(text, None);

        assert_eq!(model.reused_sections(), model.section_count() - 1);
        assert_eq!(
            model.properties().collect::<Vec<_>>(),
            scratch.properties().collect::<Vec<_>>()
        );
        assert_eq!(model.items(), scratch.items());
        assert_eq!(
            model.targets().collect::<Vec<_>>(),
            scratch.targets().collect::<Vec<_>>()
        );
        previous = model;
    }
}
