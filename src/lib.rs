//! graphql projection generator
//!
//! this crate turns a graphql schema into the descriptor set a client code
//! generator needs: one projection tree per root field, federation entity
//! representations, operation descriptors, and per-type constant tables.
//! start with [`Generator`] and [`CodegenConfig`]; lower-level pieces such as
//! [`ProjectionEngine`] and [`NameAllocator`] are exported for backends that
//! drive the traversal themselves.
//!
//! ## quick start
//!
//! ```
//! use projection_codegen::{CodegenConfig, Generator};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sdl = r#"
//!     type Query { shows: [Show] }
//!     type Show { title: String reviews: [Review] }
//!     type Review { stars: Int }
//! "#;
//! let generator = Generator::new(CodegenConfig::new())?;
//! let output = generator.generate_from_sources(&[sdl], &[] as &[&str])?;
//! assert_eq!(
//!     output.projection_names(),
//!     vec!["ShowsProjectionRoot", "ShowsReviewsProjection"]
//! );
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## command line
//!
//! the `projection-codegen` binary runs the same generation and writes the
//! descriptor set as json.

mod config;
mod constants;
mod error;
mod generator;
mod keys;
mod names;
mod projection;
mod representation;
mod schema;
mod selection;
mod source;

pub use config::{CodegenConfig, DEFAULT_MAX_PROJECTION_DEPTH, DEFAULT_SKIP_DIRECTIVE};
pub use constants::{build_constant_tables, ConstantTable};
pub use error::{Error, Result};
pub use generator::{GenerationOutput, Generator, OperationDescriptor, ENTITIES_FIELD};
pub use keys::KeySelection;
pub use names::{
    capitalize, NameAllocator, PROJECTION_SUFFIX, QUERY_SUFFIX, REPRESENTATION_SUFFIX, ROOT_SUFFIX,
};
pub use projection::{
    FragmentAccessor, NodeId, ProjectionEngine, ProjectionGraph, ProjectionKind, ProjectionNode,
    SelectionMethod, SelectionVariant, ENTITIES_ROOT_FIELD, ENTITY_UNION,
};
pub use representation::{
    RepresentationBuilder, RepresentationField, RepresentationFieldKind, RepresentationNode,
    TYPENAME_FIELD,
};
pub use schema::{
    ArgumentDefinition, Directive, FieldDefinition, FieldTarget, OperationKind, Schema,
    TypeDefinition, TypeKind, TypeRef,
};
pub use selection::{DefinedOperations, SelectionFilter};
pub use source::{read_schema_files, RemoteSchema, DEFAULT_FETCH_TIMEOUT};
