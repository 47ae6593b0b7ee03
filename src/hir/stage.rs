//! The semantic parse operation.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::builder::ProjectModelBuilder;
use super::model::ProjectModel;
use super::schema::{BuiltinSchema, SchemaProvider};
use crate::syntax::SyntaxResult;
use crate::worker::{OperationError, ParseOperation, ParseResult, check_cancelled};

/// A published Stage B result
pub type SemanticResult = Arc<ParseResult<SyntaxResult, ProjectModel>>;

/// Stage B: syntax result → project model
pub struct SemanticStage {
    schema: Arc<dyn SchemaProvider>,
}

impl Default for SemanticStage {
    fn default() -> Self {
        Self::new(Arc::new(BuiltinSchema::new()))
    }
}

impl SemanticStage {
    pub fn new(schema: Arc<dyn SchemaProvider>) -> Self {
        Self { schema }
    }
}

impl ParseOperation<SyntaxResult, ProjectModel> for SemanticStage {
    fn run(
        &self,
        input: &SyntaxResult,
        previous: Option<&ParseResult<SyntaxResult, ProjectModel>>,
        cancel: &CancellationToken,
    ) -> Result<ProjectModel, OperationError> {
        check_cancelled(cancel)?;
        let schema = self
            .schema
            .schema()
            .map_err(|err| OperationError::Unavailable(err.to_string()))?;

        let root = input.output.syntax();
        let model = ProjectModelBuilder::new(&schema).build(
            &root,
            previous.map(|p| &p.output),
            cancel,
        )?;
        trace!(
            version = %input.source.version(),
            sections = model.section_count(),
            reused = model.reused_sections(),
            diagnostics = model.diagnostics().len(),
            "project model built"
        );
        Ok(model)
    }

    fn fallback(&self, _input: &SyntaxResult) -> ProjectModel {
        ProjectModel::empty()
    }
}
