//! Property schema and value kind inference.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

// ============================================================================
// VALUE KINDS
// ============================================================================

/// Inferred or declared kind of a property value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Integer,
    /// Dotted numeric version (`1.2`, `1.2.3.4`)
    Version,
    Path,
    /// Contains `$(..)`, `@(..)` or `%(..)`; only known after evaluation
    Expression,
    Text,
    Empty,
}

const PATH_EXTENSIONS: &[&str] = &[
    ".cs", ".fs", ".vb", ".csproj", ".fsproj", ".vbproj", ".proj", ".props", ".targets", ".dll",
    ".exe", ".json", ".xml", ".ico", ".snk", ".config",
];

impl ValueKind {
    /// Classify a raw property value.
    pub fn infer(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            return Self::Empty;
        }
        if ["$(", "@(", "%("].iter().any(|marker| value.contains(marker)) {
            return Self::Expression;
        }
        if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            return Self::Bool;
        }
        let digits = value.strip_prefix('-').unwrap_or(value);
        if digits.bytes().all(|b| b.is_ascii_digit()) {
            return Self::Integer;
        }
        if is_version(value) {
            return Self::Version;
        }
        let lower = value.to_ascii_lowercase();
        if value.contains(['/', '\\']) || PATH_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return Self::Path;
        }
        Self::Text
    }

    /// Whether a value inferred as `actual` may stand where `self` is declared.
    pub fn accepts(self, actual: ValueKind) -> bool {
        match (self, actual) {
            (_, Self::Expression | Self::Empty) => true,
            (Self::Text, _) => true,
            (Self::Path, Self::Path | Self::Text) => true,
            (Self::Version, Self::Version | Self::Integer) => true,
            (declared, actual) => declared == actual,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Version => "version",
            Self::Path => "path",
            Self::Expression => "expression",
            Self::Text => "text",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_version(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    (2..=4).contains(&parts.len())
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Declared shape of a well-known property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySchema {
    pub name: SmolStr,
    pub kind: ValueKind,
}

/// Well-known properties, looked up case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    properties: FxHashMap<SmolStr, PropertySchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, name: &str, kind: ValueKind) -> Self {
        self.insert(name, kind);
        self
    }

    pub fn insert(&mut self, name: &str, kind: ValueKind) {
        self.properties.insert(
            SmolStr::new(name.to_ascii_lowercase()),
            PropertySchema {
                name: SmolStr::new(name),
                kind,
            },
        );
    }

    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name.to_ascii_lowercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Errors from loading a schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema not loaded: {0}")]
    NotLoaded(String),
    #[error("invalid schema entry '{name}': {reason}")]
    Invalid { name: SmolStr, reason: String },
}

/// Source of the property schema used by the semantic stage
pub trait SchemaProvider: Send + Sync {
    fn schema(&self) -> Result<Arc<Schema>, SchemaError>;
}

/// Schema of the common SDK-style project properties
#[derive(Debug, Clone)]
pub struct BuiltinSchema {
    schema: Arc<Schema>,
}

impl Default for BuiltinSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinSchema {
    pub fn new() -> Self {
        use ValueKind::*;

        let mut schema = Schema::new();
        for (name, kind) in [
            ("TargetFramework", Text),
            ("TargetFrameworks", Text),
            ("OutputType", Text),
            ("RootNamespace", Text),
            ("AssemblyName", Text),
            ("LangVersion", Text),
            ("Nullable", Text),
            ("ImplicitUsings", Text),
            ("Configuration", Text),
            ("Platform", Text),
            ("TreatWarningsAsErrors", Bool),
            ("IsPackable", Bool),
            ("IsTestProject", Bool),
            ("GenerateDocumentationFile", Bool),
            ("Optimize", Bool),
            ("AllowUnsafeBlocks", Bool),
            ("Deterministic", Bool),
            ("InvariantGlobalization", Bool),
            ("SelfContained", Bool),
            ("PublishTrimmed", Bool),
            ("WarningLevel", Integer),
            ("FileAlignment", Integer),
            ("Version", Version),
            ("VersionPrefix", Version),
            ("AssemblyVersion", Version),
            ("FileVersion", Version),
            ("PackageVersion", Version),
            ("OutputPath", Path),
            ("BaseOutputPath", Path),
            ("IntermediateOutputPath", Path),
            ("DocumentationFile", Path),
            ("ApplicationIcon", Path),
        ] {
            schema.insert(name, kind);
        }
        Self {
            schema: Arc::new(schema),
        }
    }
}

impl SchemaProvider for BuiltinSchema {
    fn schema(&self) -> Result<Arc<Schema>, SchemaError> {
        Ok(Arc::clone(&self.schema))
    }
}
