//! constant tables
//!
//! one table per schema type listing the names a client refers to when it
//! builds queries by hand: field names, input field names, union members,
//! enum values, and the argument names of every field.

use crate::schema::{Schema, TypeKind};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstantTable {
    pub type_name: String,
    /// field, input field, member, or value names in declaration order
    pub fields: Vec<String>,
    /// field name -> argument names, only for fields that take arguments
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub arguments: IndexMap<String, Vec<String>>,
}

/// tables for every non-scalar type, in declaration order
pub fn build_constant_tables(schema: &Schema) -> Vec<ConstantTable> {
    schema
        .types()
        .filter_map(|ty| {
            let fields = match &ty.kind {
                TypeKind::Object { fields, .. } | TypeKind::Interface { fields, .. } => {
                    fields.iter().map(|f| f.name.clone()).collect()
                }
                TypeKind::Input { fields } => fields.iter().map(|f| f.name.clone()).collect(),
                TypeKind::Union { members } => members.clone(),
                TypeKind::Enum { values } => values.clone(),
                TypeKind::Scalar => return None,
            };
            let arguments = ty
                .fields()
                .iter()
                .filter(|f| !f.arguments.is_empty())
                .map(|f| {
                    let args = f.arguments.iter().map(|a| a.name.clone()).collect();
                    (f.name.clone(), args)
                })
                .collect();
            Some(ConstantTable {
                type_name: ty.name.clone(),
                fields,
                arguments,
            })
        })
        .collect()
}
