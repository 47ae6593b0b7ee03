//! High-level IR (HIR): the MSBuild project model.
//!
//! Stage B of the pipeline. A syntax tree is lowered into a [`ProjectModel`]
//! (SDK, properties, items, targets, imports) and checked against a property
//! [`Schema`].
//!
//! ## Layers
//!
//! ```text
//! SyntaxResult             ← Stage A output
//!     │
//!     ▼
//! top-level sections       ← PropertyGroup, ItemGroup, Target, Import, ...
//!     │   (reused when the green subtree is unchanged)
//!     ▼
//! ProjectModel             ← merged sections + document-level checks
//! ```

mod builder;
mod model;
mod schema;
mod stage;

pub use builder::ProjectModelBuilder;
pub use model::{Import, Item, ProjectModel, Property, Target};
pub use schema::{BuiltinSchema, PropertySchema, Schema, SchemaError, SchemaProvider, ValueKind};
pub use stage::{SemanticResult, SemanticStage};
