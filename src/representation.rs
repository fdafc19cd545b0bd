//! federation entity representations
//!
//! for every type carrying `@key`, emit a flat descriptor holding only the
//! key fields plus `__typename`. composite key fields point at a nested
//! representation, which is built at most once per run no matter how many
//! entities reference it.

use crate::error::Result;
use crate::keys::KeySelection;
use crate::names::{NameAllocator, REPRESENTATION_SUFFIX};
use crate::schema::{FieldTarget, Schema, TypeDefinition, TypeRef};
use serde::Serialize;

pub const TYPENAME_FIELD: &str = "__typename";

/// how a representation field is typed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RepresentationFieldKind {
    /// implicit `__typename`, fixed to the entity name
    TypeName { value: String },
    Scalar,
    Composite { representation: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepresentationField {
    pub name: String,
    pub type_ref: TypeRef,
    #[serde(flatten)]
    pub kind: RepresentationFieldKind,
}

/// one generated representation record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepresentationNode {
    pub name: String,
    pub type_name: String,
    pub fields: Vec<RepresentationField>,
}

impl RepresentationNode {
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn field(&self, name: &str) -> Option<&RepresentationField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// builds representations in discovery order
pub struct RepresentationBuilder<'a> {
    schema: &'a Schema,
    names: &'a mut NameAllocator,
    nodes: Vec<RepresentationNode>,
}

impl<'a> RepresentationBuilder<'a> {
    pub fn new(schema: &'a Schema, names: &'a mut NameAllocator) -> Self {
        Self {
            schema,
            names,
            nodes: Vec::new(),
        }
    }

    /// build the representation of an entity from all of its `@key` directives
    ///
    /// returns `None` when no key carries a `fields` argument.
    pub fn build_entity(&mut self, entity: &'a TypeDefinition) -> Result<Option<String>> {
        let selections = entity
            .directives_named("key")
            .filter_map(|key| key.str_argument("fields"))
            .map(|fields| KeySelection::parse(&entity.name, fields))
            .collect::<Result<Vec<_>>>()?;
        if selections.is_empty() {
            tracing::debug!(entity = %entity.name, "key directive without fields, skipping");
            return Ok(None);
        }

        let key = KeySelection::merged(selections);
        self.build_representation(entity, &key).map(Some)
    }

    /// build the representation of `ty` restricted to `key`; memoized by type
    pub fn build_representation(
        &mut self,
        ty: &'a TypeDefinition,
        key: &KeySelection,
    ) -> Result<String> {
        let schema = self.schema;
        let name = self.names.allocate(&[ty.name.as_str()], REPRESENTATION_SUFFIX);
        if !self.names.try_reserve(&name) {
            tracing::trace!(representation = %name, "representation already generated");
            return Ok(name);
        }

        let slot = self.nodes.len();
        self.nodes.push(RepresentationNode {
            name: name.clone(),
            type_name: ty.name.clone(),
            fields: Vec::new(),
        });

        let mut fields = vec![RepresentationField {
            name: TYPENAME_FIELD.to_string(),
            type_ref: TypeRef::NonNull(Box::new(TypeRef::Named("String".to_string()))),
            kind: RepresentationFieldKind::TypeName {
                value: ty.name.clone(),
            },
        }];

        for (key_field, nested) in key.iter() {
            let Some(field) = schema.fields_of(ty).iter().find(|f| f.name == key_field) else {
                tracing::warn!(
                    entity = %ty.name,
                    field = %key_field,
                    "key references a field the type does not declare"
                );
                continue;
            };

            let kind = match (schema.field_target(field)?, nested) {
                (FieldTarget::Composite(nested_ty), Some(nested_key)) if nested_ty.is_object() => {
                    RepresentationFieldKind::Composite {
                        representation: self.build_representation(nested_ty, nested_key)?,
                    }
                }
                _ => RepresentationFieldKind::Scalar,
            };
            fields.push(RepresentationField {
                name: field.name.clone(),
                type_ref: field.type_ref.clone(),
                kind,
            });
        }

        self.nodes[slot].fields = fields;
        Ok(name)
    }

    pub fn nodes(&self) -> &[RepresentationNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<RepresentationNode> {
        self.nodes
    }
}
