//! The project model produced by the semantic stage.

use std::sync::Arc;

use indexmap::IndexMap;
use rowan::{GreenNode, TextRange, TextSize};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::schema::{Schema, ValueKind};
use crate::parser::Diagnostic;

/// A property definition (`<PropertyGroup><Name>value</Name></PropertyGroup>`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: SmolStr,
    pub value: SmolStr,
    pub kind: ValueKind,
    pub condition: Option<SmolStr>,
    pub range: TextRange,
}

/// An item (`<Compile Include="..." />`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub item_type: SmolStr,
    pub include: Option<SmolStr>,
    pub update: Option<SmolStr>,
    pub remove: Option<SmolStr>,
    pub exclude: Option<SmolStr>,
    pub condition: Option<SmolStr>,
    /// Metadata from attributes and child elements, in source order
    pub metadata: IndexMap<SmolStr, SmolStr>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: SmolStr,
    pub depends_on: Vec<SmolStr>,
    pub before: Vec<SmolStr>,
    pub after: Vec<SmolStr>,
    pub condition: Option<SmolStr>,
    /// Element names of the target's tasks
    pub tasks: Vec<SmolStr>,
    pub range: TextRange,
    /// Range of the `Target` tag name, for "first defined here"
    pub name_range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub project: SmolStr,
    pub sdk: Option<SmolStr>,
    pub condition: Option<SmolStr>,
    pub range: TextRange,
}

/// What one top-level section of the project contributes, with ranges
/// relative to the section's start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct SectionFacts {
    pub(super) sdk: Option<SmolStr>,
    pub(super) properties: Vec<Property>,
    pub(super) items: Vec<Item>,
    pub(super) targets: Vec<Target>,
    pub(super) imports: Vec<Import>,
    pub(super) diagnostics: Vec<Diagnostic>,
}

/// Semantic model of one project document
#[derive(Debug, Clone, Default)]
pub struct ProjectModel {
    pub(super) sdk: Option<SmolStr>,
    /// Keyed by lower-cased name; the last definition wins
    pub(super) properties: IndexMap<SmolStr, Property>,
    pub(super) items: Vec<Item>,
    /// Keyed by name; the first definition wins
    pub(super) targets: IndexMap<SmolStr, Target>,
    pub(super) imports: Vec<Import>,
    pub(super) diagnostics: Vec<Diagnostic>,
    /// Analysed sections of this model, by green subtree
    pub(super) sections: FxHashMap<GreenNode, Arc<SectionFacts>>,
    /// Schema the sections were checked against
    pub(super) schema: Option<Arc<Schema>>,
    pub(super) reused_sections: usize,
    pub(super) fallback: bool,
}

impl ProjectModel {
    /// The model published when the semantic stage fails.
    pub fn empty() -> Self {
        Self {
            fallback: true,
            ..Self::default()
        }
    }

    /// SDK named by the `Sdk` attribute or a top-level `<Sdk Name=".."/>`
    pub fn sdk(&self) -> Option<&str> {
        self.sdk.as_deref()
    }

    /// Property by name, case-insensitively
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name.to_ascii_lowercase().as_str())
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items of one type, e.g. `PackageReference`
    pub fn items_of_type<'a>(&'a self, item_type: &'a str) -> impl Iterator<Item = &'a Item> {
        self.items
            .iter()
            .filter(move |item| item.item_type.eq_ignore_ascii_case(item_type))
    }

    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    /// Semantic diagnostics; syntax diagnostics live on the syntax output
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Sections taken over from the previous model without re-analysis
    pub fn reused_sections(&self) -> usize {
        self.reused_sections
    }

    /// Distinct top-level sections analysed for this model
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

impl SectionFacts {
    /// Copy of the facts with every range moved to absolute offsets.
    pub(super) fn rebased(&self, base: TextSize) -> SectionFacts {
        SectionFacts {
            sdk: self.sdk.clone(),
            properties: self
                .properties
                .iter()
                .map(|p| Property {
                    range: p.range + base,
                    ..p.clone()
                })
                .collect(),
            items: self
                .items
                .iter()
                .map(|i| Item {
                    range: i.range + base,
                    ..i.clone()
                })
                .collect(),
            targets: self
                .targets
                .iter()
                .map(|t| Target {
                    range: t.range + base,
                    name_range: t.name_range + base,
                    ..t.clone()
                })
                .collect(),
            imports: self
                .imports
                .iter()
                .map(|i| Import {
                    range: i.range + base,
                    ..i.clone()
                })
                .collect(),
            diagnostics: self
                .diagnostics
                .iter()
                .map(|d| d.clone().shifted(base))
                .collect(),
        }
    }
}
