//! Lowering a syntax tree into a [`ProjectModel`].

use std::sync::Arc;

use indexmap::IndexMap;
use rowan::{TextRange, TextSize};
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;

use super::model::{Import, Item, ProjectModel, Property, SectionFacts, Target};
use super::schema::{Schema, ValueKind};
use crate::parser::{
    AstNode, Diagnostic, ErrorCode, RelatedInfo, SyntaxNode, XmlDocument, XmlElement,
};
use crate::worker::{OperationError, check_cancelled};

/// Attributes of an item that are not metadata
const ITEM_OPERATIONS: &[&str] = &["Include", "Update", "Remove", "Exclude", "Condition"];

/// Builds a [`ProjectModel`], reusing sections of a previous model whose
/// green subtree is unchanged and that was checked against the same schema.
pub struct ProjectModelBuilder<'s> {
    schema: &'s Arc<Schema>,
}

impl<'s> ProjectModelBuilder<'s> {
    pub fn new(schema: &'s Arc<Schema>) -> Self {
        Self { schema }
    }

    pub fn build(
        &self,
        root: &SyntaxNode,
        previous: Option<&ProjectModel>,
        cancel: &CancellationToken,
    ) -> Result<ProjectModel, OperationError> {
        check_cancelled(cancel)?;
        let mut model = ProjectModel {
            schema: Some(Arc::clone(self.schema)),
            ..ProjectModel::default()
        };
        let previous = previous.filter(|p| self.checked_with_same_schema(p));
        let Some(project) = XmlDocument::cast(root.clone()).and_then(|doc| doc.root()) else {
            return Ok(model);
        };

        let name = project.name().unwrap_or_default();
        if name != "Project" {
            let range = project
                .name_token()
                .map(|t| t.text_range())
                .unwrap_or_else(|| project.syntax().text_range());
            model.diagnostics.push(Diagnostic::error(
                ErrorCode::E0301,
                format!("root element must be 'Project', found '{name}'"),
                range,
            ));
            return Ok(model);
        }
        model.sdk = project.attribute("Sdk").filter(|sdk| !sdk.trim().is_empty());

        for section in project.child_elements() {
            check_cancelled(cancel)?;
            let green = section.syntax().green().into_owned();
            let base = section.syntax().text_range().start();
            let facts = match previous.and_then(|p| p.sections.get(&green)) {
                Some(facts) => {
                    model.reused_sections += 1;
                    Arc::clone(facts)
                }
                None => Arc::new(self.analyse_section(&section, base)),
            };
            merge(&mut model, facts.rebased(base));
            model.sections.insert(green, facts);
        }

        Ok(model)
    }

    fn checked_with_same_schema(&self, previous: &ProjectModel) -> bool {
        previous
            .schema
            .as_ref()
            .is_some_and(|schema| Arc::ptr_eq(schema, self.schema) || schema == self.schema)
    }

    // =========================================================================
    // Sections
    // =========================================================================

    fn analyse_section(&self, section: &XmlElement, base: TextSize) -> SectionFacts {
        let mut facts = SectionFacts::default();
        match section.name().as_deref() {
            Some("PropertyGroup") => {
                for element in section.child_elements() {
                    self.property(&element, base, &mut facts);
                }
            }
            Some("ItemGroup") => {
                for element in section.child_elements() {
                    item(&element, base, &mut facts);
                }
            }
            Some("Target") => target(section, base, &mut facts),
            Some("Import") => import(section, base, &mut facts),
            Some("Sdk") => facts.sdk = section.attribute("Name"),
            _ => {}
        }
        facts
    }

    fn property(&self, element: &XmlElement, base: TextSize, facts: &mut SectionFacts) {
        let Some(name) = element.name() else {
            return;
        };
        let value = SmolStr::new(element.text());
        let kind = ValueKind::infer(&value);
        let range = relative(element.syntax().text_range(), base);

        if let Some(declared) = self.schema.property(&name) {
            if !declared.kind.accepts(kind) {
                facts.diagnostics.push(Diagnostic::warning(
                    ErrorCode::E0306,
                    format!(
                        "property '{name}' should be {}, found {kind} '{value}'",
                        declared.kind
                    ),
                    range,
                ));
            }
        }

        facts.properties.push(Property {
            name,
            value,
            kind,
            condition: element.attribute("Condition"),
            range,
        });
    }
}

fn item(element: &XmlElement, base: TextSize, facts: &mut SectionFacts) {
    let Some(item_type) = element.name() else {
        return;
    };
    let range = relative(element.syntax().text_range(), base);

    let mut metadata = IndexMap::new();
    for attribute in element.attributes() {
        let Some(name) = attribute.name() else {
            continue;
        };
        if !ITEM_OPERATIONS.contains(&name.as_str()) {
            metadata.insert(name, attribute.value().unwrap_or_default());
        }
    }
    for child in element.child_elements() {
        if let Some(name) = child.name() {
            metadata.insert(name, SmolStr::new(child.text()));
        }
    }

    let include = element.attribute("Include");
    let update = element.attribute("Update");
    let remove = element.attribute("Remove");
    if include.is_none() && update.is_none() && remove.is_none() {
        facts.diagnostics.push(Diagnostic::error(
            ErrorCode::E0305,
            format!("item '{item_type}' needs an Include, Update or Remove attribute"),
            name_range(element, base),
        ));
    }

    facts.items.push(Item {
        item_type,
        include,
        update,
        remove,
        exclude: element.attribute("Exclude"),
        condition: element.attribute("Condition"),
        metadata,
        range,
    });
}

fn target(element: &XmlElement, base: TextSize, facts: &mut SectionFacts) {
    let name_range = name_range(element, base);
    let Some(name) = element.attribute("Name").filter(|n| !n.trim().is_empty()) else {
        facts.diagnostics.push(Diagnostic::error(
            ErrorCode::E0302,
            "target has no Name",
            name_range,
        ));
        return;
    };

    facts.targets.push(Target {
        name,
        depends_on: split_list(element.attribute("DependsOnTargets")),
        before: split_list(element.attribute("BeforeTargets")),
        after: split_list(element.attribute("AfterTargets")),
        condition: element.attribute("Condition"),
        tasks: element.child_elements().filter_map(|task| task.name()).collect(),
        range: relative(element.syntax().text_range(), base),
        name_range,
    });
}

fn import(element: &XmlElement, base: TextSize, facts: &mut SectionFacts) {
    let range = relative(element.syntax().text_range(), base);
    let Some(project) = element.attribute("Project").filter(|p| !p.trim().is_empty()) else {
        facts.diagnostics.push(Diagnostic::error(
            ErrorCode::E0304,
            "import has no Project",
            name_range(element, base),
        ));
        return;
    };

    facts.imports.push(Import {
        project,
        sdk: element.attribute("Sdk"),
        condition: element.attribute("Condition"),
        range,
    });
}

/// Fold one rebased section into the model.
fn merge(model: &mut ProjectModel, facts: SectionFacts) {
    if model.sdk.is_none() {
        model.sdk = facts.sdk;
    }
    for property in facts.properties {
        let key = SmolStr::new(property.name.to_ascii_lowercase());
        model.properties.insert(key, property);
    }
    model.items.extend(facts.items);
    model.imports.extend(facts.imports);
    model.diagnostics.extend(facts.diagnostics);

    for target in facts.targets {
        match model.targets.get(&target.name) {
            Some(first) => model.diagnostics.push(
                Diagnostic::error(
                    ErrorCode::E0303,
                    format!("target '{}' is defined more than once", target.name),
                    target.name_range,
                )
                .with_related(RelatedInfo::new("first defined here", first.name_range)),
            ),
            None => {
                model.targets.insert(target.name.clone(), target);
            }
        }
    }
}

fn name_range(element: &XmlElement, base: TextSize) -> TextRange {
    let range = element
        .name_token()
        .map(|t| t.text_range())
        .unwrap_or_else(|| element.syntax().text_range());
    relative(range, base)
}

fn relative(range: TextRange, base: TextSize) -> TextRange {
    range - base
}

/// `A; B;;C` → `[A, B, C]`
fn split_list(value: Option<SmolStr>) -> Vec<SmolStr> {
    value
        .map(|value| {
            value
                .split(';')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(SmolStr::new)
                .collect()
        })
        .unwrap_or_default()
}
