//! selection filters for defined-query generation
//!
//! a [`SelectionFilter`] is the field tree a caller-supplied operation
//! actually selects. the traversal consults it to prune fields and fragments
//! when `generateClientApiForDefinedQuery` is on.

use crate::error::Result;
use crate::schema::OperationKind;
use graphql_parser::query::{
    parse_query, Definition, FragmentDefinition, OperationDefinition, Selection, SelectionSet,
    TypeCondition,
};
use indexmap::IndexMap;
use std::collections::HashMap;

/// fields and type-conditioned fragments selected at one level
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionFilter {
    fields: IndexMap<String, SelectionFilter>,
    fragments: IndexMap<String, SelectionFilter>,
}

impl SelectionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// add a selected field with its sub-selection
    pub fn with_field(mut self, name: impl Into<String>, child: SelectionFilter) -> Self {
        self.fields.entry(name.into()).or_default().merge(child);
        self
    }

    /// add a fragment on a concrete or member type
    pub fn with_fragment(mut self, type_name: impl Into<String>, child: SelectionFilter) -> Self {
        self.fragments.entry(type_name.into()).or_default().merge(child);
        self
    }

    pub fn selects(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field(&self, name: &str) -> Option<&SelectionFilter> {
        self.fields.get(name)
    }

    pub fn fragment(&self, type_name: &str) -> Option<&SelectionFilter> {
        self.fragments.get(type_name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.fragments.is_empty()
    }

    /// fold a fragment on `type_name` itself into the plain field set
    pub fn narrowed(&self, type_name: &str) -> SelectionFilter {
        let mut narrowed = self.clone();
        if let Some(own) = narrowed.fragments.shift_remove(type_name) {
            narrowed.merge(own);
        }
        narrowed
    }

    fn merge(&mut self, other: SelectionFilter) {
        for (name, child) in other.fields {
            self.fields.entry(name).or_default().merge(child);
        }
        for (type_name, child) in other.fragments {
            self.fragments.entry(type_name).or_default().merge(child);
        }
    }
}

/// root field filters collected from executable documents
#[derive(Debug, Clone, Default)]
pub struct DefinedOperations {
    roots: HashMap<OperationKind, IndexMap<String, SelectionFilter>>,
}

impl DefinedOperations {
    /// parse one executable document
    pub fn parse(query: &str) -> Result<Self> {
        Self::from_sources(&[query])
    }

    /// parse several executable documents, merging repeated root fields
    pub fn from_sources<S: AsRef<str>>(sources: &[S]) -> Result<Self> {
        let mut operations = Self::default();
        for source in sources {
            let document = parse_query::<String>(source.as_ref())?;
            let fragments: HashMap<&str, &FragmentDefinition<'_, String>> = document
                .definitions
                .iter()
                .filter_map(|def| match def {
                    Definition::Fragment(fragment) => Some((fragment.name.as_str(), fragment)),
                    Definition::Operation(_) => None,
                })
                .collect();

            for def in &document.definitions {
                let Definition::Operation(operation) = def else {
                    continue;
                };
                let (kind, selection_set) = match operation {
                    OperationDefinition::SelectionSet(set) => (OperationKind::Query, set),
                    OperationDefinition::Query(query) => (OperationKind::Query, &query.selection_set),
                    OperationDefinition::Mutation(mutation) => {
                        (OperationKind::Mutation, &mutation.selection_set)
                    }
                    OperationDefinition::Subscription(subscription) => {
                        (OperationKind::Subscription, &subscription.selection_set)
                    }
                };

                let filter = collect(selection_set, &fragments, &mut Vec::new());
                let roots = operations.roots.entry(kind).or_default();
                for (name, child) in filter.fields {
                    roots.entry(name).or_default().merge(child);
                }
            }
        }
        Ok(operations)
    }

    /// filter for one root field, if any operation selects it
    pub fn root_filter(&self, kind: OperationKind, field: &str) -> Option<&SelectionFilter> {
        self.roots.get(&kind).and_then(|roots| roots.get(field))
    }

    /// selected root field names for an operation kind, in first-seen order
    pub fn root_fields(&self, kind: OperationKind) -> impl Iterator<Item = &str> {
        self.roots
            .get(&kind)
            .into_iter()
            .flat_map(|roots| roots.keys().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.roots.values().all(IndexMap::is_empty)
    }
}

fn collect<'a, 'd>(
    selection_set: &'d SelectionSet<'a, String>,
    fragments: &HashMap<&'d str, &'d FragmentDefinition<'a, String>>,
    visiting: &mut Vec<&'d str>,
) -> SelectionFilter {
    let mut filter = SelectionFilter::default();
    for item in &selection_set.items {
        match item {
            Selection::Field(field) => {
                if field.name == "__typename" {
                    continue;
                }
                let child = collect(&field.selection_set, fragments, visiting);
                filter.fields.entry(field.name.clone()).or_default().merge(child);
            }
            Selection::InlineFragment(inline) => {
                let child = collect(&inline.selection_set, fragments, visiting);
                match &inline.type_condition {
                    Some(TypeCondition::On(type_name)) => {
                        filter.fragments.entry(type_name.clone()).or_default().merge(child);
                    }
                    None => filter.merge(child),
                }
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.fragment_name.as_str();
                if visiting.contains(&name) {
                    tracing::warn!(fragment = %name, "ignoring recursive fragment spread");
                    continue;
                }
                let Some(&fragment) = fragments.get(name) else {
                    tracing::warn!(fragment = %name, "ignoring spread of undefined fragment");
                    continue;
                };
                visiting.push(fragment.name.as_str());
                let child = collect(&fragment.selection_set, fragments, visiting);
                visiting.pop();
                let TypeCondition::On(type_name) = &fragment.type_condition;
                filter.fragments.entry(type_name.clone()).or_default().merge(child);
            }
        }
    }
    filter
}
