//! generation run
//!
//! a [`Generator`] processes every root field of a schema sequentially with
//! one shared [`NameAllocator`], so names are unique across the whole run,
//! and collects the descriptors an emission backend turns into source files.

use crate::config::CodegenConfig;
use crate::constants::{build_constant_tables, ConstantTable};
use crate::error::{Error, Result};
use crate::names::{NameAllocator, QUERY_SUFFIX, ROOT_SUFFIX};
use crate::projection::{ProjectionEngine, ProjectionGraph, ProjectionNode, ENTITIES_ROOT_FIELD};
use crate::representation::{RepresentationBuilder, RepresentationNode};
use crate::schema::{
    ArgumentDefinition, FieldDefinition, OperationKind, Schema, TypeDefinition, TypeRef,
};
use crate::selection::DefinedOperations;
use serde::Serialize;
use std::collections::HashSet;

/// federation entity lookup field
pub const ENTITIES_FIELD: &str = "_entities";

const FEDERATION_PREFIX: &str = "federation";

/// one generated `<Field>GraphQLQuery` class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDescriptor {
    pub name: String,
    pub operation: OperationKind,
    pub field_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_root: Option<String>,
}

/// everything one run produces, in discovery order
#[derive(Debug, Default, Serialize)]
pub struct GenerationOutput {
    pub operations: Vec<OperationDescriptor>,
    pub projections: Vec<ProjectionNode>,
    pub representations: Vec<RepresentationNode>,
    pub constants: Vec<ConstantTable>,
}

impl GenerationOutput {
    pub fn projection(&self, name: &str) -> Option<&ProjectionNode> {
        self.projections.iter().find(|p| p.name == name)
    }

    pub fn representation(&self, name: &str) -> Option<&RepresentationNode> {
        self.representations.iter().find(|r| r.name == name)
    }

    pub fn projection_names(&self) -> Vec<&str> {
        self.projections.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn representation_names(&self) -> Vec<&str> {
        self.representations.iter().map(|r| r.name.as_str()).collect()
    }
}

/// projection generator
#[derive(Debug, Clone)]
pub struct Generator {
    config: CodegenConfig,
}

impl Generator {
    /// create a generator, validating the configuration
    pub fn new(config: CodegenConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    /// parse schema and operation documents, then generate
    pub fn generate_from_sources<S: AsRef<str>, Q: AsRef<str>>(
        &self,
        schema_sources: &[S],
        query_sources: &[Q],
    ) -> Result<GenerationOutput> {
        let schema = Schema::from_sources(schema_sources, &self.config)?;
        let operations = if query_sources.is_empty() {
            None
        } else {
            Some(DefinedOperations::from_sources(query_sources)?)
        };
        self.generate(&schema, operations.as_ref())
    }

    /// run one generation over `schema`
    pub fn generate(
        &self,
        schema: &Schema,
        operations: Option<&DefinedOperations>,
    ) -> Result<GenerationOutput> {
        let defined = if self.config.generate_client_api_for_defined_query {
            let operations = operations.ok_or_else(|| {
                Error::Config(
                    "defined-query generation needs at least one operation document".to_string(),
                )
            })?;
            Some(operations)
        } else {
            None
        };

        let mut names = NameAllocator::new(self.config.short_projection_names);
        let mut graph = ProjectionGraph::new();
        let mut output = GenerationOutput::default();

        for (kind, root_type) in schema.root_types() {
            if !self.includes(kind) {
                continue;
            }
            if let Some(defined) = defined {
                check_selected_roots(defined, kind, &root_type.name, root_type.fields())?;
            }

            for field in root_type.fields() {
                let filter = match defined {
                    Some(defined) => match defined.root_filter(kind, &field.name) {
                        Some(filter) => Some(filter),
                        None => continue,
                    },
                    None => None,
                };

                let path = root_path(&mut names, kind, &field.name);
                let mut engine = ProjectionEngine::new(schema, &mut names, &mut graph, &self.config);
                let root = engine.build_root_projection_at(path.clone(), field, filter)?;
                let projection_root = root
                    .and_then(|id| graph.get(id))
                    .map(|node| node.name.clone());

                output.operations.push(OperationDescriptor {
                    name: reserve(&mut names, &path, QUERY_SUFFIX)?,
                    operation: kind,
                    field_name: field.name.clone(),
                    arguments: field.arguments.clone(),
                    projection_root,
                });
            }
        }

        if !self.config.skip_entity_queries {
            let entities = schema.entities();
            if !entities.is_empty() {
                self.generate_entities(schema, &entities, &mut names, &mut graph, &mut output)?;
            }
        }

        output.projections = graph.into_nodes();
        output.constants = build_constant_tables(schema);
        check_unique(&output)?;

        tracing::debug!(
            operations = output.operations.len(),
            projections = output.projections.len(),
            representations = output.representations.len(),
            "generation finished"
        );
        Ok(output)
    }

    fn generate_entities<'s>(
        &self,
        schema: &'s Schema,
        entities: &[&'s TypeDefinition],
        names: &mut NameAllocator,
        graph: &mut ProjectionGraph,
        output: &mut GenerationOutput,
    ) -> Result<()> {
        let path = entities_path(names);
        let root = ProjectionEngine::new(schema, names, graph, &self.config)
            .build_entities_projection_at(path.clone(), entities)?;
        let projection_root = root.and_then(|id| graph.get(id)).map(|node| node.name.clone());

        let mut builder = RepresentationBuilder::new(schema, names);
        for &entity in entities {
            builder.build_entity(entity)?;
        }
        output.representations = builder.into_nodes();

        output.operations.push(OperationDescriptor {
            name: reserve(names, &path, QUERY_SUFFIX)?,
            operation: OperationKind::Query,
            field_name: ENTITIES_FIELD.to_string(),
            arguments: vec![ArgumentDefinition {
                name: "representations".to_string(),
                type_ref: TypeRef::NonNull(Box::new(TypeRef::List(Box::new(TypeRef::NonNull(
                    Box::new(TypeRef::Named("_Any".to_string())),
                ))))),
                default_value: None,
            }],
            projection_root,
        });
        Ok(())
    }

    fn includes(&self, kind: OperationKind) -> bool {
        match kind {
            OperationKind::Query => self.config.include_queries,
            OperationKind::Mutation => self.config.include_mutations,
            OperationKind::Subscription => self.config.include_subscriptions,
        }
    }
}

/// `[field]`, or `[kind, field]` when an earlier root already owns the plain name
fn root_path(names: &mut NameAllocator, kind: OperationKind, field: &str) -> Vec<String> {
    let plain = vec![field.to_string()];
    if kind != OperationKind::Query && is_taken(names, &plain) {
        vec![kind.to_string(), field.to_string()]
    } else {
        plain
    }
}

/// `[entities]`, or `[federation, entities]` when a root field named `entities` exists
fn entities_path(names: &mut NameAllocator) -> Vec<String> {
    let plain = vec![ENTITIES_ROOT_FIELD.to_string()];
    if is_taken(names, &plain) {
        vec![FEDERATION_PREFIX.to_string(), ENTITIES_ROOT_FIELD.to_string()]
    } else {
        plain
    }
}

fn is_taken(names: &mut NameAllocator, path: &[String]) -> bool {
    let root_name = names.allocate(path, ROOT_SUFFIX);
    let query_name = names.allocate(path, QUERY_SUFFIX);
    names.is_reserved(&root_name) || names.is_reserved(&query_name)
}

fn reserve<S: AsRef<str>>(names: &mut NameAllocator, path: &[S], suffix: &str) -> Result<String> {
    let name = names.allocate(path, suffix);
    if names.try_reserve(&name) {
        Ok(name)
    } else {
        Err(Error::NameCollision(name))
    }
}

fn check_selected_roots(
    defined: &DefinedOperations,
    kind: OperationKind,
    root_type: &str,
    fields: &[FieldDefinition],
) -> Result<()> {
    for selected in defined.root_fields(kind) {
        if !fields.iter().any(|f| f.name == selected) {
            return Err(Error::UnknownOperationField {
                operation: root_type.to_string(),
                field: selected.to_string(),
            });
        }
    }
    Ok(())
}

fn check_unique(output: &GenerationOutput) -> Result<()> {
    let mut seen = HashSet::new();
    let names = output
        .projections
        .iter()
        .map(|p| &p.name)
        .chain(output.representations.iter().map(|r| &r.name))
        .chain(output.operations.iter().map(|o| &o.name));
    for name in names {
        if !seen.insert(name) {
            return Err(Error::NameCollision(name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
        type Query {
            shows(titleFilter: String): [Show]
            count: Int
        }
        type Mutation {
            shows(title: String!): Show
            addReview(score: Int): Review
        }
        type Show { title: String reviews: [Review] }
        type Review { score: Int }
    "#;

    #[test]
    fn test_operations_in_root_order() {
        let generator = Generator::new(CodegenConfig::new()).unwrap();
        let output = generator
            .generate_from_sources(&[SCHEMA], &[] as &[&str])
            .unwrap();
        let ops: Vec<(&str, OperationKind)> = output
            .operations
            .iter()
            .map(|o| (o.name.as_str(), o.operation))
            .collect();
        assert_eq!(
            ops,
            vec![
                ("ShowsGraphQLQuery", OperationKind::Query),
                ("CountGraphQLQuery", OperationKind::Query),
                ("MutationShowsGraphQLQuery", OperationKind::Mutation),
                ("AddReviewGraphQLQuery", OperationKind::Mutation),
            ]
        );
        assert_eq!(
            output.operations[0].projection_root.as_deref(),
            Some("ShowsProjectionRoot")
        );
        assert!(output.operations[1].projection_root.is_none());
        assert_eq!(
            output.operations[2].projection_root.as_deref(),
            Some("MutationShowsProjectionRoot")
        );
    }

    #[test]
    fn test_projection_discovery_order() {
        let generator = Generator::new(CodegenConfig::new()).unwrap();
        let output = generator
            .generate_from_sources(&[SCHEMA], &[] as &[&str])
            .unwrap();
        assert_eq!(
            output.projection_names(),
            vec![
                "ShowsProjectionRoot",
                "ShowsReviewsProjection",
                "MutationShowsProjectionRoot",
                "MutationShowsReviewsProjection",
                "AddReviewProjectionRoot",
            ]
        );
    }

    #[test]
    fn test_operation_kinds_filter() {
        let config = CodegenConfig::new().with_operation_kinds(true, false, false);
        let output = Generator::new(config)
            .unwrap()
            .generate_from_sources(&[SCHEMA], &[] as &[&str])
            .unwrap();
        assert!(output
            .operations
            .iter()
            .all(|o| o.operation == OperationKind::Query));
    }

    #[test]
    fn test_defined_query_scoping() {
        let config = CodegenConfig::new().with_generate_client_api_for_defined_query(true);
        let output = Generator::new(config)
            .unwrap()
            .generate_from_sources(&[SCHEMA], &["query { shows { title } }"])
            .unwrap();
        assert_eq!(output.operations.len(), 1);
        assert_eq!(output.projection_names(), vec!["ShowsProjectionRoot"]);
        assert_eq!(
            output.projection("ShowsProjectionRoot").unwrap().method_names(),
            vec!["title"]
        );
    }

    #[test]
    fn test_defined_query_requires_operations() {
        let config = CodegenConfig::new().with_generate_client_api_for_defined_query(true);
        let err = Generator::new(config)
            .unwrap()
            .generate_from_sources(&[SCHEMA], &[] as &[&str])
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_defined_query_unknown_root_field() {
        let config = CodegenConfig::new().with_generate_client_api_for_defined_query(true);
        let err = Generator::new(config)
            .unwrap()
            .generate_from_sources(&[SCHEMA], &["query { movies { title } }"])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownOperationField { ref operation, ref field } if operation == "Query" && field == "movies"
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Generator::new(CodegenConfig::new().with_skip_directive("")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_constants_included() {
        let output = Generator::new(CodegenConfig::new())
            .unwrap()
            .generate_from_sources(&[SCHEMA], &[] as &[&str])
            .unwrap();
        assert!(output.constants.iter().any(|t| t.type_name == "Show"));
    }
}
