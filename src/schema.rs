//! type graph model
//!
//! a read-only, owned view over one or more parsed schema documents.
//! extensions are merged into their base types and skipped types/fields are
//! dropped before any traversal sees the graph.

use crate::config::CodegenConfig;
use crate::error::{Error, Result};
use graphql_parser::schema::{
    self as ast, parse_schema, Definition, TypeDefinition as AstTypeDefinition, TypeExtension,
    Value,
};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// graphql type reference with list and non-null wrappers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// innermost named type
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    pub fn is_list(&self) -> bool {
        match self {
            TypeRef::List(_) => true,
            TypeRef::NonNull(inner) => inner.is_list(),
            TypeRef::Named(_) => false,
        }
    }

    fn from_ast(ty: &ast::Type<'_, String>) -> Self {
        match ty {
            ast::Type::NamedType(name) => TypeRef::Named(name.clone()),
            ast::Type::ListType(inner) => TypeRef::List(Box::new(TypeRef::from_ast(inner))),
            ast::Type::NonNullType(inner) => TypeRef::NonNull(Box::new(TypeRef::from_ast(inner))),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{name}"),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

impl Serialize for TypeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// directive application with arguments converted to json values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directive {
    pub name: String,
    pub arguments: IndexMap<String, serde_json::Value>,
}

impl Directive {
    /// string-valued argument, if present
    pub fn str_argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).and_then(|value| value.as_str())
    }

    pub fn bool_argument(&self, name: &str) -> Option<bool> {
        self.arguments.get(name).and_then(|value| value.as_bool())
    }

    fn from_ast(directive: &ast::Directive<'_, String>) -> Self {
        Self {
            name: directive.name.clone(),
            arguments: directive
                .arguments
                .iter()
                .map(|(name, value)| (name.clone(), value_to_json(value)))
                .collect(),
        }
    }
}

/// field or input argument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentDefinition {
    pub name: String,
    pub type_ref: TypeRef,
    /// default value as a graphql literal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl ArgumentDefinition {
    fn from_ast(value: &ast::InputValue<'_, String>) -> Self {
        Self {
            name: value.name.clone(),
            type_ref: TypeRef::from_ast(&value.value_type),
            default_value: value.default_value.as_ref().map(format_value),
        }
    }
}

/// field on an object or interface type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    pub name: String,
    /// declaring type
    pub owner: String,
    pub type_ref: TypeRef,
    pub arguments: Vec<ArgumentDefinition>,
    pub directives: Vec<Directive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,
}

impl FieldDefinition {
    fn from_ast(owner: &str, field: &ast::Field<'_, String>) -> Self {
        let directives: Vec<Directive> = field.directives.iter().map(Directive::from_ast).collect();
        let deprecation = directives
            .iter()
            .find(|d| d.name == "deprecated")
            .map(|d| {
                d.str_argument("reason")
                    .unwrap_or("No longer supported")
                    .to_string()
            });
        Self {
            name: field.name.clone(),
            owner: owner.to_string(),
            type_ref: TypeRef::from_ast(&field.field_type),
            arguments: field.arguments.iter().map(ArgumentDefinition::from_ast).collect(),
            directives,
            deprecation,
        }
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directives.iter().any(|d| d.name == name)
    }
}

/// shape of a named schema type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Object {
        fields: Vec<FieldDefinition>,
        implements: Vec<String>,
    },
    Interface {
        fields: Vec<FieldDefinition>,
        implements: Vec<String>,
    },
    Union {
        members: Vec<String>,
    },
    Enum {
        values: Vec<String>,
    },
    Scalar,
    Input {
        fields: Vec<ArgumentDefinition>,
    },
}

/// named schema type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: TypeKind,
    pub directives: Vec<Directive>,
}

impl TypeDefinition {
    pub fn is_object(&self) -> bool {
        matches!(self.kind, TypeKind::Object { .. })
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface { .. })
    }

    pub fn is_union(&self) -> bool {
        matches!(self.kind, TypeKind::Union { .. })
    }

    /// scalars and enums are selected directly, never projected
    pub fn is_leaf(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Scalar | TypeKind::Enum { .. } | TypeKind::Input { .. }
        )
    }

    /// output fields (empty for non-composite kinds)
    pub fn fields(&self) -> &[FieldDefinition] {
        match &self.kind {
            TypeKind::Object { fields, .. } | TypeKind::Interface { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn implements(&self) -> &[String] {
        match &self.kind {
            TypeKind::Object { implements, .. } | TypeKind::Interface { implements, .. } => {
                implements
            }
            _ => &[],
        }
    }

    pub fn directives_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Directive> + 'a {
        self.directives.iter().filter(move |d| d.name == name)
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directives.iter().any(|d| d.name == name)
    }

    fn from_ast(ty: &AstTypeDefinition<'_, String>) -> Self {
        match ty {
            AstTypeDefinition::Object(obj) => Self {
                name: obj.name.clone(),
                kind: TypeKind::Object {
                    fields: fields_from_ast(&obj.name, &obj.fields),
                    implements: obj.implements_interfaces.clone(),
                },
                directives: directives_from_ast(&obj.directives),
            },
            AstTypeDefinition::Interface(iface) => Self {
                name: iface.name.clone(),
                kind: TypeKind::Interface {
                    fields: fields_from_ast(&iface.name, &iface.fields),
                    implements: iface.implements_interfaces.clone(),
                },
                directives: directives_from_ast(&iface.directives),
            },
            AstTypeDefinition::Union(union_ty) => Self {
                name: union_ty.name.clone(),
                kind: TypeKind::Union {
                    members: union_ty.types.clone(),
                },
                directives: directives_from_ast(&union_ty.directives),
            },
            AstTypeDefinition::Enum(enum_ty) => Self {
                name: enum_ty.name.clone(),
                kind: TypeKind::Enum {
                    values: enum_ty.values.iter().map(|v| v.name.clone()).collect(),
                },
                directives: directives_from_ast(&enum_ty.directives),
            },
            AstTypeDefinition::Scalar(scalar) => Self {
                name: scalar.name.clone(),
                kind: TypeKind::Scalar,
                directives: directives_from_ast(&scalar.directives),
            },
            AstTypeDefinition::InputObject(input) => Self {
                name: input.name.clone(),
                kind: TypeKind::Input {
                    fields: input.fields.iter().map(ArgumentDefinition::from_ast).collect(),
                },
                directives: directives_from_ast(&input.directives),
            },
        }
    }

    /// synthesize a definition from an extension without a base type
    fn from_extension(ext: &TypeExtension<'_, String>) -> Self {
        let (name, kind, directives) = match ext {
            TypeExtension::Object(obj) => (
                obj.name.clone(),
                TypeKind::Object {
                    fields: Vec::new(),
                    implements: Vec::new(),
                },
                Vec::new(),
            ),
            TypeExtension::Interface(iface) => (
                iface.name.clone(),
                TypeKind::Interface {
                    fields: Vec::new(),
                    implements: Vec::new(),
                },
                Vec::new(),
            ),
            TypeExtension::Union(union_ty) => (
                union_ty.name.clone(),
                TypeKind::Union {
                    members: Vec::new(),
                },
                Vec::new(),
            ),
            TypeExtension::Enum(enum_ty) => (
                enum_ty.name.clone(),
                TypeKind::Enum { values: Vec::new() },
                Vec::new(),
            ),
            TypeExtension::Scalar(scalar) => (scalar.name.clone(), TypeKind::Scalar, Vec::new()),
            TypeExtension::InputObject(input) => (
                input.name.clone(),
                TypeKind::Input { fields: Vec::new() },
                Vec::new(),
            ),
        };
        Self {
            name,
            kind,
            directives,
        }
    }

    fn apply_extension(&mut self, ext: &TypeExtension<'_, String>) {
        match (&mut self.kind, ext) {
            (TypeKind::Object { fields, implements }, TypeExtension::Object(obj)) => {
                fields.extend(fields_from_ast(&self.name, &obj.fields));
                merge_names(implements, &obj.implements_interfaces);
                self.directives.extend(directives_from_ast(&obj.directives));
            }
            (TypeKind::Interface { fields, implements }, TypeExtension::Interface(iface)) => {
                fields.extend(fields_from_ast(&self.name, &iface.fields));
                merge_names(implements, &iface.implements_interfaces);
                self.directives.extend(directives_from_ast(&iface.directives));
            }
            (TypeKind::Union { members }, TypeExtension::Union(union_ty)) => {
                merge_names(members, &union_ty.types);
                self.directives.extend(directives_from_ast(&union_ty.directives));
            }
            (TypeKind::Enum { values }, TypeExtension::Enum(enum_ty)) => {
                values.extend(enum_ty.values.iter().map(|v| v.name.clone()));
                self.directives.extend(directives_from_ast(&enum_ty.directives));
            }
            (TypeKind::Input { fields }, TypeExtension::InputObject(input)) => {
                fields.extend(input.fields.iter().map(ArgumentDefinition::from_ast));
                self.directives.extend(directives_from_ast(&input.directives));
            }
            (TypeKind::Scalar, TypeExtension::Scalar(scalar)) => {
                self.directives.extend(directives_from_ast(&scalar.directives));
            }
            _ => {
                tracing::warn!(
                    type_name = %self.name,
                    "ignoring extension whose kind differs from the base type"
                );
            }
        }
    }
}

/// what a field's return type resolves to
#[derive(Debug, Clone, Copy)]
pub enum FieldTarget<'a> {
    /// scalar, enum, or mapped type: selected directly
    Leaf,
    /// object, interface, or union: gets a projection
    Composite(&'a TypeDefinition),
}

/// merged schema over all source documents
#[derive(Debug, Clone)]
pub struct Schema {
    types: IndexMap<String, TypeDefinition>,
    skipped: BTreeSet<String>,
    mapped_scalars: BTreeSet<String>,
    query_type: Option<String>,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
}

impl Schema {
    /// parse a single sdl document with default settings
    pub fn parse(sdl: &str) -> Result<Self> {
        Self::from_sources(&[sdl], &CodegenConfig::default())
    }

    /// parse and merge several sdl documents
    ///
    /// base definitions from every document are registered first, then
    /// extensions are appended in document order.
    pub fn from_sources<S: AsRef<str>>(sources: &[S], config: &CodegenConfig) -> Result<Self> {
        let documents = sources
            .iter()
            .map(|source| parse_schema::<String>(source.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut types: IndexMap<String, TypeDefinition> = IndexMap::new();
        let mut query_type = None;
        let mut mutation_type = None;
        let mut subscription_type = None;

        for document in &documents {
            for def in &document.definitions {
                match def {
                    Definition::TypeDefinition(ty) => {
                        let ty = TypeDefinition::from_ast(ty);
                        if types.contains_key(&ty.name) {
                            tracing::warn!(type_name = %ty.name, "duplicate type definition, keeping the first");
                            continue;
                        }
                        types.insert(ty.name.clone(), ty);
                    }
                    Definition::SchemaDefinition(schema) => {
                        query_type = schema.query.clone().or(query_type);
                        mutation_type = schema.mutation.clone().or(mutation_type);
                        subscription_type = schema.subscription.clone().or(subscription_type);
                    }
                    _ => {}
                }
            }
        }

        for document in &documents {
            for def in &document.definitions {
                if let Definition::TypeExtension(ext) = def {
                    let name = extension_name(ext);
                    let ty = types.entry(name.to_string()).or_insert_with(|| {
                        tracing::debug!(type_name = %name, "extension without base type");
                        TypeDefinition::from_extension(ext)
                    });
                    ty.apply_extension(ext);
                }
            }
        }

        let mut schema = Self {
            types,
            skipped: BTreeSet::new(),
            mapped_scalars: config.type_mapping.keys().cloned().collect(),
            query_type: query_type.or_else(|| Some("Query".to_string())),
            mutation_type: mutation_type.or_else(|| Some("Mutation".to_string())),
            subscription_type: subscription_type.or_else(|| Some("Subscription".to_string())),
        };
        schema.drop_skipped(&config.skip_directive);
        Ok(schema)
    }

    fn drop_skipped(&mut self, skip_directive: &str) {
        self.skipped = self
            .types
            .values()
            .filter(|ty| ty.has_directive(skip_directive))
            .map(|ty| ty.name.clone())
            .collect();
        let skipped = &self.skipped;
        self.types.retain(|name, _| !skipped.contains(name));

        let keep_field = |field: &FieldDefinition| {
            !field.has_directive(skip_directive) && !skipped.contains(field.type_ref.named_type())
        };
        for ty in self.types.values_mut() {
            match &mut ty.kind {
                TypeKind::Object { fields, .. } | TypeKind::Interface { fields, .. } => {
                    fields.retain(|field| keep_field(field));
                }
                TypeKind::Union { members } => members.retain(|m| !skipped.contains(m)),
                _ => {}
            }
        }
    }

    /// look up a named type
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    /// all types in declaration order
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    /// unwrap list/non-null wrappers and look up the innermost named type
    pub fn resolve(&self, type_ref: &TypeRef) -> Option<&TypeDefinition> {
        self.types.get(type_ref.named_type())
    }

    /// built-in, declared, or mapped scalar name
    pub fn is_known_scalar(&self, name: &str) -> bool {
        BUILTIN_SCALARS.contains(&name)
            || self.mapped_scalars.contains(name)
            || matches!(self.types.get(name), Some(ty) if matches!(ty.kind, TypeKind::Scalar))
    }

    pub fn is_skipped(&self, name: &str) -> bool {
        self.skipped.contains(name)
    }

    /// classify a field's return type; unknown names are fatal
    pub fn field_target(&self, field: &FieldDefinition) -> Result<FieldTarget<'_>> {
        let type_name = field.type_ref.named_type();
        if self.mapped_scalars.contains(type_name) {
            return Ok(FieldTarget::Leaf);
        }
        match self.resolve(&field.type_ref) {
            Some(ty) if ty.is_leaf() => Ok(FieldTarget::Leaf),
            Some(ty) => Ok(FieldTarget::Composite(ty)),
            None if self.is_known_scalar(type_name) => Ok(FieldTarget::Leaf),
            None => Err(Error::UnresolvedType {
                owner: field.owner.clone(),
                field: field.name.clone(),
                type_name: type_name.to_string(),
            }),
        }
    }

    /// base fields followed by extension fields, skip-filtered
    pub fn fields_of<'a>(&self, ty: &'a TypeDefinition) -> &'a [FieldDefinition] {
        ty.fields()
    }

    /// object types implementing an interface, in declaration order
    pub fn implementers_of(&self, interface: &str) -> Vec<&TypeDefinition> {
        self.types
            .values()
            .filter(|ty| ty.is_object() && ty.implements().iter().any(|i| i == interface))
            .collect()
    }

    /// union member types in declaration order, unresolvable members skipped
    pub fn members_of(&self, union_name: &str) -> Vec<&TypeDefinition> {
        match self.types.get(union_name).map(|ty| &ty.kind) {
            Some(TypeKind::Union { members }) => members
                .iter()
                .filter_map(|member| {
                    let resolved = self.types.get(member.as_str());
                    if resolved.is_none() {
                        tracing::debug!(union = %union_name, member = %member, "skipping unresolvable union member");
                    }
                    resolved
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// object and interface types carrying a `@key` directive
    pub fn entities(&self) -> Vec<&TypeDefinition> {
        self.types
            .values()
            .filter(|ty| (ty.is_object() || ty.is_interface()) && ty.has_directive("key"))
            .collect()
    }

    /// root operation types that exist in the schema, in query/mutation/subscription order
    pub fn root_types(&self) -> Vec<(OperationKind, &TypeDefinition)> {
        [
            (OperationKind::Query, &self.query_type),
            (OperationKind::Mutation, &self.mutation_type),
            (OperationKind::Subscription, &self.subscription_type),
        ]
        .into_iter()
        .filter_map(|(kind, name)| {
            let ty = self.types.get(name.as_deref()?)?;
            ty.is_object().then_some((kind, ty))
        })
        .collect()
    }

    pub fn root_type(&self, kind: OperationKind) -> Option<&TypeDefinition> {
        self.root_types()
            .into_iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, ty)| ty)
    }
}

/// root operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        };
        f.write_str(name)
    }
}

fn extension_name<'b>(ext: &'b TypeExtension<'_, String>) -> &'b str {
    match ext {
        TypeExtension::Object(obj) => &obj.name,
        TypeExtension::Interface(iface) => &iface.name,
        TypeExtension::Union(union_ty) => &union_ty.name,
        TypeExtension::Enum(enum_ty) => &enum_ty.name,
        TypeExtension::Scalar(scalar) => &scalar.name,
        TypeExtension::InputObject(input) => &input.name,
    }
}

/// append names not yet present, keeping first-seen order
fn merge_names(names: &mut Vec<String>, extra: &[String]) {
    for name in extra {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
}

fn fields_from_ast(owner: &str, fields: &[ast::Field<'_, String>]) -> Vec<FieldDefinition> {
    fields
        .iter()
        .map(|field| FieldDefinition::from_ast(owner, field))
        .collect()
}

fn directives_from_ast(directives: &[ast::Directive<'_, String>]) -> Vec<Directive> {
    directives.iter().map(Directive::from_ast).collect()
}

fn value_to_json(value: &Value<'_, String>) -> serde_json::Value {
    match value {
        Value::Variable(name) => serde_json::Value::String(format!("${name}")),
        Value::Int(number) => number
            .as_i64()
            .map(serde_json::Value::from)
            .unwrap_or(serde_json::Value::Null),
        Value::Float(float) => serde_json::Number::from_f64(*float)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(text) => serde_json::Value::String(text.clone()),
        Value::Boolean(flag) => serde_json::Value::Bool(*flag),
        Value::Null => serde_json::Value::Null,
        Value::Enum(name) => serde_json::Value::String(name.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Object(fields) => serde_json::Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), value_to_json(value)))
                .collect(),
        ),
    }
}

/// render a value as a graphql literal
pub(crate) fn format_value(value: &Value<'_, String>) -> String {
    match value {
        Value::Variable(name) => format!("${name}"),
        Value::Int(number) => number.as_i64().map(|n| n.to_string()).unwrap_or_default(),
        Value::Float(float) => format!("{float:?}"),
        Value::String(text) => {
            serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
        }
        Value::Boolean(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        Value::Enum(name) => name.clone(),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(key, value)| format!("{key}: {}", format_value(value)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}
