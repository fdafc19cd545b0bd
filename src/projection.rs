//! projection traversal engine
//!
//! walks the (generally cyclic) type graph from a root field and emits one
//! [`ProjectionNode`] per distinct path. nodes live in a run-wide
//! [`ProjectionGraph`] arena and reference each other by [`NodeId`], so a
//! cycle is just an edge back to an already reserved node.
//!
//! termination rests on the [`NameAllocator`]: every node is created under a
//! reserved name, and a child whose `(field, type)` pair already appears on
//! the chain of non-root ancestors reuses that ancestor's path, hence its
//! already reserved name.

use crate::config::CodegenConfig;
use crate::error::{Error, Result};
use crate::names::{capitalize, NameAllocator, PROJECTION_SUFFIX, ROOT_SUFFIX};
use crate::schema::{ArgumentDefinition, FieldDefinition, FieldTarget, Schema, TypeDefinition, TypeRef};
use crate::selection::SelectionFilter;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// root field name used for the federation `_entities` projection
pub const ENTITIES_ROOT_FIELD: &str = "entities";

/// federation union over all entity types
pub const ENTITY_UNION: &str = "_Entity";

/// handle into a [`ProjectionGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// what a generated projection class is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// top-level projection of a query, mutation, or subscription field
    Root,
    /// projection of an object, interface, or union field
    Sub,
    /// projection of one implementer or union member
    Fragment,
    /// one-method projection hosting the arguments of a scalar field
    ArgumentWrapper,
}

/// overloads generated for one selection method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionVariant {
    Plain,
    WithArguments,
    WithVariableReferences,
}

/// field-selection method on a projection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionMethod {
    pub field_name: String,
    pub field_type: TypeRef,
    /// child projection; `None` for plain scalar selections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentDefinition>,
    pub variants: Vec<SelectionVariant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,
}

impl SelectionMethod {
    fn new(field: &FieldDefinition, target: Option<(NodeId, String)>) -> Self {
        let variants = if field.arguments.is_empty() {
            vec![SelectionVariant::Plain]
        } else {
            vec![
                SelectionVariant::Plain,
                SelectionVariant::WithArguments,
                SelectionVariant::WithVariableReferences,
            ]
        };
        let (target, target_name) = match target {
            Some((id, name)) => (Some(id), Some(name)),
            None => (None, None),
        };
        Self {
            field_name: field.name.clone(),
            field_type: field.type_ref.clone(),
            target,
            target_name,
            arguments: field.arguments.clone(),
            variants,
            deprecation: field.deprecation.clone(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.target.is_none()
    }
}

/// `on<Type>()` accessor exposing a fragment projection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentAccessor {
    pub type_name: String,
    pub method_name: String,
    pub target: NodeId,
    pub target_name: String,
}

/// one generated projection class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionNode {
    pub id: NodeId,
    pub name: String,
    pub kind: ProjectionKind,
    /// projected schema type
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    /// root projection of this tree; equals `id` for roots
    pub root: NodeId,
    pub depth: usize,
    pub path: Vec<String>,
    pub methods: Vec<SelectionMethod>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fragments: Vec<FragmentAccessor>,
    /// object selections were cut by the depth bound
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl ProjectionNode {
    pub fn is_root(&self) -> bool {
        self.kind == ProjectionKind::Root
    }

    pub fn method(&self, field_name: &str) -> Option<&SelectionMethod> {
        self.methods.iter().find(|m| m.field_name == field_name)
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.field_name.as_str()).collect()
    }

    pub fn fragment_names(&self) -> Vec<&str> {
        self.fragments.iter().map(|f| f.method_name.as_str()).collect()
    }
}

/// run-wide arena of projection nodes in discovery order
#[derive(Debug, Default)]
pub struct ProjectionGraph {
    slots: Vec<Option<ProjectionNode>>,
    by_name: HashMap<String, NodeId>,
}

impl ProjectionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&ProjectionNode> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn by_name(&self, name: &str) -> Option<&ProjectionNode> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    /// every populated node, root-first then depth-first in field order
    pub fn nodes(&self) -> impl Iterator<Item = &ProjectionNode> {
        self.slots.iter().flatten()
    }

    /// the nodes of one root's tree
    pub fn tree(&self, root: NodeId) -> impl Iterator<Item = &ProjectionNode> {
        self.nodes().filter(move |node| node.root == root)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn into_nodes(self) -> Vec<ProjectionNode> {
        self.slots.into_iter().flatten().collect()
    }

    fn open(&mut self, name: &str) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(None);
        self.by_name.insert(name.to_string(), id);
        id
    }

    fn fill(&mut self, node: ProjectionNode) {
        let idx = node.id.0;
        self.slots[idx] = Some(node);
    }

    fn id_of(&self, name: &str) -> Result<NodeId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::NameCollision(name.to_string()))
    }
}

/// placement of a node that is being populated
struct Placement {
    id: NodeId,
    name: String,
    kind: ProjectionKind,
    parent: Option<NodeId>,
    root: NodeId,
    depth: usize,
    path: Vec<String>,
}

/// non-root ancestor reached through a field
struct ChainEntry {
    field: String,
    type_name: String,
    path: Vec<String>,
}

/// traversal over one schema, sharing names and nodes across a whole run
pub struct ProjectionEngine<'a> {
    schema: &'a Schema,
    names: &'a mut NameAllocator,
    graph: &'a mut ProjectionGraph,
    max_depth: Option<usize>,
}

impl<'a> ProjectionEngine<'a> {
    pub fn new(
        schema: &'a Schema,
        names: &'a mut NameAllocator,
        graph: &'a mut ProjectionGraph,
        config: &CodegenConfig,
    ) -> Self {
        Self {
            schema,
            names,
            graph,
            max_depth: config.max_projection_depth,
        }
    }

    /// build the projection tree of one root field
    ///
    /// returns `None` when the field resolves to a scalar or enum. with a
    /// `filter`, only the fields and fragments it selects are projected.
    pub fn build_root_projection(
        &mut self,
        field: &FieldDefinition,
        filter: Option<&SelectionFilter>,
    ) -> Result<Option<NodeId>> {
        self.build_root_projection_at(vec![field.name.clone()], field, filter)
    }

    /// like [`Self::build_root_projection`], naming the tree after `path`
    pub fn build_root_projection_at(
        &mut self,
        path: Vec<String>,
        field: &FieldDefinition,
        filter: Option<&SelectionFilter>,
    ) -> Result<Option<NodeId>> {
        let schema = self.schema;
        let ty = match schema.field_target(field)? {
            FieldTarget::Leaf => {
                tracing::trace!(field = %field.name, "scalar root field, no projection");
                return Ok(None);
            }
            FieldTarget::Composite(ty) => ty,
        };

        let name = self.names.allocate(&path, ROOT_SUFFIX);
        if !self.names.try_reserve(&name) {
            return self.graph.id_of(&name).map(Some);
        }

        tracing::debug!(root = %name, type_name = %ty.name, "building root projection");
        let id = self.graph.open(&name);
        let place = Placement {
            id,
            name,
            kind: ProjectionKind::Root,
            parent: None,
            root: id,
            depth: 0,
            path,
        };
        self.populate(place, ty, &mut Vec::new(), filter.cloned())?;
        Ok(Some(id))
    }

    /// build `EntitiesProjectionRoot` with one fragment per entity type
    pub fn build_entities_projection(
        &mut self,
        entities: &[&'a TypeDefinition],
    ) -> Result<Option<NodeId>> {
        self.build_entities_projection_at(vec![ENTITIES_ROOT_FIELD.to_string()], entities)
    }

    /// like [`Self::build_entities_projection`], naming the tree after `path`
    pub fn build_entities_projection_at(
        &mut self,
        path: Vec<String>,
        entities: &[&'a TypeDefinition],
    ) -> Result<Option<NodeId>> {
        if entities.is_empty() {
            return Ok(None);
        }

        let name = self.names.allocate(&path, ROOT_SUFFIX);
        if !self.names.try_reserve(&name) {
            return Err(Error::NameCollision(name));
        }

        tracing::debug!(root = %name, entities = entities.len(), "building entities projection");
        let id = self.graph.open(&name);
        let place = Placement {
            id,
            name,
            kind: ProjectionKind::Root,
            parent: None,
            root: id,
            depth: 0,
            path,
        };
        let mut fragments = Vec::with_capacity(entities.len());
        for &entity in entities {
            fragments.push(self.fragment(&place, entity, &mut Vec::new(), None)?);
        }
        self.graph.fill(ProjectionNode {
            id: place.id,
            name: place.name,
            kind: place.kind,
            type_name: ENTITY_UNION.to_string(),
            parent: None,
            root: place.root,
            depth: 0,
            path: place.path,
            methods: Vec::new(),
            fragments,
            truncated: false,
        });
        Ok(Some(id))
    }

    fn populate(
        &mut self,
        place: Placement,
        ty: &'a TypeDefinition,
        chain: &mut Vec<ChainEntry>,
        filter: Option<SelectionFilter>,
    ) -> Result<()> {
        let schema = self.schema;
        let filter = filter.map(|f| f.narrowed(&ty.name));
        let at_depth_limit = self.max_depth.is_some_and(|max| place.depth >= max);
        let mut truncated = false;
        let mut methods = Vec::new();

        for field in schema.fields_of(ty) {
            let field_filter = match &filter {
                Some(filter) => match filter.field(&field.name) {
                    Some(child) => Some(child.clone()),
                    None => continue,
                },
                None => None,
            };

            match schema.field_target(field)? {
                FieldTarget::Leaf if field.arguments.is_empty() => {
                    methods.push(SelectionMethod::new(field, None));
                }
                FieldTarget::Leaf if at_depth_limit => {
                    // argument overloads stay on the method, no wrapper past the bound
                    methods.push(SelectionMethod::new(field, None));
                }
                FieldTarget::Leaf => {
                    let target = self.argument_wrapper(&place, field)?;
                    methods.push(SelectionMethod::new(field, Some(target)));
                }
                FieldTarget::Composite(_) if at_depth_limit => {
                    tracing::debug!(
                        projection = %place.name,
                        field = %field.name,
                        "depth bound reached, dropping object selection"
                    );
                    truncated = true;
                }
                FieldTarget::Composite(child_ty) => {
                    let target = self.child(&place, field, child_ty, chain, field_filter)?;
                    methods.push(SelectionMethod::new(field, Some(target)));
                }
            }
        }

        let concrete_types = if ty.is_interface() {
            schema.implementers_of(&ty.name)
        } else if ty.is_union() {
            schema.members_of(&ty.name)
        } else {
            Vec::new()
        };

        let mut fragments = Vec::with_capacity(concrete_types.len());
        for concrete in concrete_types {
            let fragment_filter = match &filter {
                Some(filter) => match filter.fragment(&concrete.name) {
                    Some(child) => Some(child.clone()),
                    None => continue,
                },
                None => None,
            };
            fragments.push(self.fragment(&place, concrete, chain, fragment_filter)?);
        }

        tracing::trace!(
            projection = %place.name,
            methods = methods.len(),
            fragments = fragments.len(),
            "projection populated"
        );
        self.graph.fill(ProjectionNode {
            id: place.id,
            name: place.name,
            kind: place.kind,
            type_name: ty.name.clone(),
            parent: place.parent,
            root: place.root,
            depth: place.depth,
            path: place.path,
            methods,
            fragments,
            truncated,
        });
        Ok(())
    }

    fn child(
        &mut self,
        parent: &Placement,
        field: &FieldDefinition,
        ty: &'a TypeDefinition,
        chain: &mut Vec<ChainEntry>,
        filter: Option<SelectionFilter>,
    ) -> Result<(NodeId, String)> {
        let folded = if filter.is_none() {
            chain
                .iter()
                .find(|entry| entry.field == field.name && entry.type_name == ty.name)
                .map(|entry| entry.path.clone())
        } else {
            None
        };
        let is_back_link = folded.is_some();
        let path = folded.unwrap_or_else(|| extend_path(&parent.path, &field.name));

        let name = self.names.allocate(&path, PROJECTION_SUFFIX);
        if !self.names.try_reserve(&name) {
            if is_back_link {
                tracing::debug!(from = %parent.name, to = %name, field = %field.name, "cycle, linking to ancestor projection");
            }
            let id = self.graph.id_of(&name)?;
            return Ok((id, name));
        }

        let id = self.graph.open(&name);
        chain.push(ChainEntry {
            field: field.name.clone(),
            type_name: ty.name.clone(),
            path: path.clone(),
        });
        let place = Placement {
            id,
            name: name.clone(),
            kind: ProjectionKind::Sub,
            parent: Some(parent.id),
            root: parent.root,
            depth: parent.depth + 1,
            path,
        };
        let result = self.populate(place, ty, chain, filter);
        chain.pop();
        result?;
        Ok((id, name))
    }

    fn fragment(
        &mut self,
        parent: &Placement,
        concrete: &'a TypeDefinition,
        chain: &mut Vec<ChainEntry>,
        filter: Option<SelectionFilter>,
    ) -> Result<FragmentAccessor> {
        let path = extend_path(&parent.path, &concrete.name);
        let name = self.names.allocate(&path, PROJECTION_SUFFIX);
        let id = if self.names.try_reserve(&name) {
            let id = self.graph.open(&name);
            let place = Placement {
                id,
                name: name.clone(),
                kind: ProjectionKind::Fragment,
                parent: Some(parent.id),
                root: parent.root,
                depth: parent.depth,
                path,
            };
            self.populate(place, concrete, chain, filter)?;
            id
        } else {
            self.graph.id_of(&name)?
        };

        Ok(FragmentAccessor {
            type_name: concrete.name.clone(),
            method_name: format!("on{}", capitalize(&concrete.name)),
            target: id,
            target_name: name,
        })
    }

    fn argument_wrapper(
        &mut self,
        parent: &Placement,
        field: &FieldDefinition,
    ) -> Result<(NodeId, String)> {
        let path = extend_path(&parent.path, &field.name);
        let name = self.names.allocate(&path, PROJECTION_SUFFIX);
        if !self.names.try_reserve(&name) {
            let id = self.graph.id_of(&name)?;
            return Ok((id, name));
        }

        let id = self.graph.open(&name);
        self.graph.fill(ProjectionNode {
            id,
            name: name.clone(),
            kind: ProjectionKind::ArgumentWrapper,
            type_name: field.type_ref.named_type().to_string(),
            parent: Some(parent.id),
            root: parent.root,
            depth: parent.depth + 1,
            path,
            methods: Vec::new(),
            fragments: Vec::new(),
            truncated: false,
        });
        Ok((id, name))
    }
}

fn extend_path(path: &[String], segment: &str) -> Vec<String> {
    let mut extended = Vec::with_capacity(path.len() + 1);
    extended.extend_from_slice(path);
    extended.push(segment.to_string());
    extended
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(
        sdl: &str,
        root: &str,
        config: &CodegenConfig,
        filter: Option<&SelectionFilter>,
    ) -> Result<(Option<NodeId>, ProjectionGraph)> {
        let schema = Schema::from_sources(&[sdl], config)?;
        let mut names = NameAllocator::new(config.short_projection_names());
        let mut graph = ProjectionGraph::new();
        let field = schema
            .get("Query")
            .and_then(|q| q.fields().iter().find(|f| f.name == root))
            .cloned()
            .expect("root field");
        let id = ProjectionEngine::new(&schema, &mut names, &mut graph, config)
            .build_root_projection(&field, filter)?;
        Ok((id, graph))
    }

    fn names(graph: &ProjectionGraph) -> Vec<&str> {
        graph.nodes().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_scalar_root_has_no_projection() {
        let (id, graph) = build("type Query { count: Int }", "count", &CodegenConfig::new(), None).unwrap();
        assert!(id.is_none());
        assert!(graph.is_empty());
    }

    #[test]
    fn test_self_reference_terminates() {
        let sdl = "type Query { persons: [Person] } type Person { name: String friends: [Person] }";
        let (id, graph) = build(sdl, "persons", &CodegenConfig::new().with_max_projection_depth(None), None).unwrap();
        assert_eq!(names(&graph), vec!["PersonsProjectionRoot", "PersonsFriendsProjection"]);

        let root = graph.get(id.unwrap()).unwrap();
        assert_eq!(root.method_names(), vec!["name", "friends"]);
        let friends = graph.by_name("PersonsFriendsProjection").unwrap();
        assert_eq!(friends.method_names(), vec!["name", "friends"]);
        assert_eq!(friends.method("friends").unwrap().target, Some(friends.id));
        assert_eq!(friends.root, root.id);
        assert_eq!(root.root, root.id);
    }

    #[test]
    fn test_mutual_recursion_terminates() {
        let sdl = r#"
            type Query { movies: [Movie] }
            type Movie { title: String details: Details }
            type Details { show: Show }
            type Show { movie: Movie }
        "#;
        let (_, graph) = build(sdl, "movies", &CodegenConfig::new().with_max_projection_depth(None), None).unwrap();
        assert_eq!(
            names(&graph),
            vec![
                "MoviesProjectionRoot",
                "MoviesDetailsProjection",
                "MoviesDetailsShowProjection",
                "MoviesDetailsShowMovieProjection",
            ]
        );
        let movie = graph.by_name("MoviesDetailsShowMovieProjection").unwrap();
        assert_eq!(
            movie.method("details").unwrap().target_name.as_deref(),
            Some("MoviesDetailsProjection")
        );
    }

    #[test]
    fn test_interface_fragments() {
        let sdl = r#"
            type Query { search: [Show] }
            interface Show { title: String }
            type Movie implements Show { title: String duration: Int }
            type Series implements Show { title: String episodes: Int }
        "#;
        let (id, graph) = build(sdl, "search", &CodegenConfig::new(), None).unwrap();
        assert_eq!(
            names(&graph),
            vec!["SearchProjectionRoot", "SearchMovieProjection", "SearchSeriesProjection"]
        );
        let root = graph.get(id.unwrap()).unwrap();
        assert_eq!(root.method_names(), vec!["title"]);
        assert_eq!(root.fragment_names(), vec!["onMovie", "onSeries"]);

        let movie = graph.by_name("SearchMovieProjection").unwrap();
        assert_eq!(movie.kind, ProjectionKind::Fragment);
        assert_eq!(movie.method_names(), vec!["title", "duration"]);
        assert_eq!(movie.parent, Some(root.id));
        assert_eq!(movie.depth, 0);
    }

    #[test]
    fn test_fragment_recurses_into_object_fields() {
        let sdl = r#"
            type Query { search: [Show] }
            interface Show { title: String }
            type Movie implements Show { title: String actors: [Actor] }
            type Series implements Show { title: String episodes: Int }
            type Actor { name: String }
        "#;
        let (id, graph) = build(sdl, "search", &CodegenConfig::new(), None).unwrap();
        assert_eq!(
            names(&graph),
            vec![
                "SearchProjectionRoot",
                "SearchMovieProjection",
                "SearchMovieActorsProjection",
                "SearchSeriesProjection",
            ]
        );

        let root = graph.get(id.unwrap()).unwrap();
        let movie = graph.by_name("SearchMovieProjection").unwrap();
        let actors = movie.method("actors").unwrap();
        assert_eq!(actors.target_name.as_deref(), Some("SearchMovieActorsProjection"));

        let child = graph.by_name("SearchMovieActorsProjection").unwrap();
        assert_eq!(actors.target, Some(child.id));
        assert_eq!(child.kind, ProjectionKind::Sub);
        assert_eq!(child.parent, Some(movie.id));
        assert_eq!(child.root, root.id);
        assert_eq!(child.depth, 1);
        assert_eq!(child.method_names(), vec!["name"]);
    }

    #[test]
    fn test_cycle_inside_fragment_links_back() {
        let sdl = r#"
            type Query { feed: [Item] }
            union Item = Post | Photo
            type Post { title: String replies: [Post] }
            type Photo { url: String }
        "#;
        let (_, graph) = build(sdl, "feed", &CodegenConfig::new(), None).unwrap();
        assert_eq!(
            names(&graph),
            vec![
                "FeedProjectionRoot",
                "FeedPostProjection",
                "FeedPostRepliesProjection",
                "FeedPhotoProjection",
            ]
        );
        let replies = graph.by_name("FeedPostRepliesProjection").unwrap();
        assert_eq!(replies.method_names(), vec!["title", "replies"]);
        assert_eq!(replies.method("replies").unwrap().target, Some(replies.id));
    }

    #[test]
    fn test_scalar_with_arguments_gets_wrapper() {
        let sdl = r#"
            type Query { shows: [Show] }
            type Show { title(format: String = "short"): String rating: Int }
        "#;
        let (_, graph) = build(sdl, "shows", &CodegenConfig::new(), None).unwrap();
        assert_eq!(names(&graph), vec!["ShowsProjectionRoot", "ShowsTitleProjection"]);
        let wrapper = graph.by_name("ShowsTitleProjection").unwrap();
        assert_eq!(wrapper.kind, ProjectionKind::ArgumentWrapper);
        assert_eq!(wrapper.type_name, "String");
        assert!(wrapper.methods.is_empty());

        let root = graph.by_name("ShowsProjectionRoot").unwrap();
        let title = root.method("title").unwrap();
        assert_eq!(
            title.variants,
            vec![
                SelectionVariant::Plain,
                SelectionVariant::WithArguments,
                SelectionVariant::WithVariableReferences,
            ]
        );
        assert_eq!(title.arguments[0].default_value.as_deref(), Some("\"short\""));
        assert!(root.method("rating").unwrap().is_scalar());
    }

    #[test]
    fn test_no_wrapper_at_depth_bound() {
        let sdl = r#"
            type Query { shows: [Show] }
            type Show { title(format: String): String reviews: [Review] }
            type Review { text(format: String): String }
        "#;
        let config = CodegenConfig::new().with_max_projection_depth(Some(1));
        let (_, graph) = build(sdl, "shows", &config, None).unwrap();
        assert_eq!(
            names(&graph),
            vec!["ShowsProjectionRoot", "ShowsTitleProjection", "ShowsReviewsProjection"]
        );
        assert!(graph.nodes().all(|n| n.depth <= 1));

        let reviews = graph.by_name("ShowsReviewsProjection").unwrap();
        let text = reviews.method("text").unwrap();
        assert!(text.is_scalar());
        assert_eq!(text.arguments[0].name, "format");
        assert_eq!(text.variants.len(), 3);
    }

    #[test]
    fn test_object_field_with_arguments_adds_no_extra_node() {
        let sdl = r#"
            type Query { shows: [Show] }
            type Show { reviews(minScore: Int): [Review] }
            type Review { score: Int }
        "#;
        let (_, graph) = build(sdl, "shows", &CodegenConfig::new(), None).unwrap();
        assert_eq!(names(&graph), vec!["ShowsProjectionRoot", "ShowsReviewsProjection"]);
        let reviews = graph.by_name("ShowsProjectionRoot").unwrap().method("reviews").unwrap();
        assert_eq!(reviews.variants.len(), 3);
    }

    #[test]
    fn test_depth_bound_truncates() {
        let sdl = r#"
            type Query { a: A }
            type A { x: Int b: B }
            type B { y: Int c: C }
            type C { z: Int }
        "#;
        let config = CodegenConfig::new().with_max_projection_depth(Some(1));
        let (_, graph) = build(sdl, "a", &config, None).unwrap();
        assert_eq!(names(&graph), vec!["AProjectionRoot", "ABProjection"]);
        let b = graph.by_name("ABProjection").unwrap();
        assert_eq!(b.method_names(), vec!["y"]);
        assert!(b.truncated);

        let config = CodegenConfig::new().with_max_projection_depth(Some(0));
        let (_, graph) = build(sdl, "a", &config, None).unwrap();
        let root = graph.by_name("AProjectionRoot").unwrap();
        assert_eq!(root.method_names(), vec!["x"]);
        assert!(root.truncated);
    }

    #[test]
    fn test_filter_prunes_fields_and_fragments() {
        let sdl = r#"
            type Query { search: [Result] persons: [Person] }
            union Result = Movie | Actor
            type Movie { title: String year: Int }
            type Actor { name: String }
            type Person { name: String age: Int friends: [Person] }
        "#;
        let filter = SelectionFilter::new().with_fragment(
            "Movie",
            SelectionFilter::new().with_field("title", SelectionFilter::new()),
        );
        let (_, graph) = build(sdl, "search", &CodegenConfig::new(), Some(&filter)).unwrap();
        assert_eq!(names(&graph), vec!["SearchProjectionRoot", "SearchMovieProjection"]);
        assert_eq!(
            graph.by_name("SearchMovieProjection").unwrap().method_names(),
            vec!["title"]
        );

        let filter = SelectionFilter::new().with_field(
            "friends",
            SelectionFilter::new().with_field(
                "friends",
                SelectionFilter::new().with_field("age", SelectionFilter::new()),
            ),
        );
        let (_, graph) = build(sdl, "persons", &CodegenConfig::new(), Some(&filter)).unwrap();
        assert_eq!(
            names(&graph),
            vec![
                "PersonsProjectionRoot",
                "PersonsFriendsProjection",
                "PersonsFriendsFriendsProjection",
            ]
        );
        assert_eq!(
            graph.by_name("PersonsFriendsFriendsProjection").unwrap().method_names(),
            vec!["age"]
        );
    }

    #[test]
    fn test_unresolved_object_type_is_fatal() {
        let sdl = "type Query { shows: [Show] } type Show { studio: Studio }";
        let err = build(sdl, "shows", &CodegenConfig::new(), None).unwrap_err();
        assert!(matches!(err, Error::UnresolvedType { ref type_name, .. } if type_name == "Studio"));
    }

    #[test]
    fn test_entities_projection() {
        let schema = Schema::parse(
            r#"
            type Movie @key(fields: "id") { id: ID title: String }
            type Actor @key(fields: "name") { name: String }
            "#,
        )
        .unwrap();
        let mut names = NameAllocator::new(false);
        let mut graph = ProjectionGraph::new();
        let entities = schema.entities();
        let id = ProjectionEngine::new(&schema, &mut names, &mut graph, &CodegenConfig::new())
            .build_entities_projection(&entities)
            .unwrap()
            .unwrap();
        let root = graph.get(id).unwrap();
        assert_eq!(root.name, "EntitiesProjectionRoot");
        assert_eq!(root.type_name, ENTITY_UNION);
        assert_eq!(root.fragment_names(), vec!["onMovie", "onActor"]);
        assert_eq!(
            graph.by_name("EntitiesMovieProjection").unwrap().method_names(),
            vec!["id", "title"]
        );
    }
}
