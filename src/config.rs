//! generator configuration
//!
//! build a [`CodegenConfig`] with the builder helpers or load one from json,
//! then hand it to [`crate::Generator::new`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// default bound on projection nesting
pub const DEFAULT_MAX_PROJECTION_DEPTH: usize = 10;

/// directive marking types and fields excluded from generation
pub const DEFAULT_SKIP_DIRECTIVE: &str = "skipcodegen";

/// configuration for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CodegenConfig {
    /// stop adding object selections once a node is this deep (`None` = unbounded)
    pub(crate) max_projection_depth: Option<usize>,

    /// abbreviate path segments in generated names
    pub(crate) short_projection_names: bool,

    /// skip entity representations and the `_entities` root
    pub(crate) skip_entity_queries: bool,

    /// only project what caller-supplied operations select
    pub(crate) generate_client_api_for_defined_query: bool,

    /// graphql type name -> target language type, treated as scalars
    pub(crate) type_mapping: BTreeMap<String, String>,

    /// directive name that drops a type or field
    pub(crate) skip_directive: String,

    pub(crate) include_queries: bool,
    pub(crate) include_mutations: bool,
    pub(crate) include_subscriptions: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            max_projection_depth: Some(DEFAULT_MAX_PROJECTION_DEPTH),
            short_projection_names: false,
            skip_entity_queries: false,
            generate_client_api_for_defined_query: false,
            type_mapping: BTreeMap::new(),
            skip_directive: DEFAULT_SKIP_DIRECTIVE.to_string(),
            include_queries: true,
            include_mutations: true,
            include_subscriptions: true,
        }
    }
}

impl CodegenConfig {
    /// create a configuration with default settings
    ///
    /// # example
    ///
    /// ```
    /// use projection_codegen::CodegenConfig;
    ///
    /// let config = CodegenConfig::new()
    ///     .with_max_projection_depth(Some(4))
    ///     .with_short_projection_names(true);
    /// assert_eq!(config.max_projection_depth(), Some(4));
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// parse a json configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// read and parse a json configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// set the projection depth bound
    ///
    /// default: 10
    pub fn with_max_projection_depth(mut self, depth: Option<usize>) -> Self {
        self.max_projection_depth = depth;
        self
    }

    /// enable abbreviated projection names
    pub fn with_short_projection_names(mut self, short: bool) -> Self {
        self.short_projection_names = short;
        self
    }

    /// disable entity representations
    pub fn with_skip_entity_queries(mut self, skip: bool) -> Self {
        self.skip_entity_queries = skip;
        self
    }

    /// scope generation to caller-supplied operations
    pub fn with_generate_client_api_for_defined_query(mut self, defined: bool) -> Self {
        self.generate_client_api_for_defined_query = defined;
        self
    }

    /// map a graphql type name to a target type; the name becomes a scalar
    pub fn with_type_mapping(
        mut self,
        graphql_type: impl Into<String>,
        target_type: impl Into<String>,
    ) -> Self {
        self.type_mapping
            .insert(graphql_type.into(), target_type.into());
        self
    }

    /// change the directive used to drop types and fields
    pub fn with_skip_directive(mut self, directive: impl Into<String>) -> Self {
        self.skip_directive = directive.into();
        self
    }

    /// choose which root operation types produce projections
    pub fn with_operation_kinds(mut self, queries: bool, mutations: bool, subscriptions: bool) -> Self {
        self.include_queries = queries;
        self.include_mutations = mutations;
        self.include_subscriptions = subscriptions;
        self
    }

    pub fn max_projection_depth(&self) -> Option<usize> {
        self.max_projection_depth
    }

    pub fn short_projection_names(&self) -> bool {
        self.short_projection_names
    }

    pub fn skip_entity_queries(&self) -> bool {
        self.skip_entity_queries
    }

    pub fn generate_client_api_for_defined_query(&self) -> bool {
        self.generate_client_api_for_defined_query
    }

    pub fn type_mapping(&self) -> &BTreeMap<String, String> {
        &self.type_mapping
    }

    pub fn skip_directive(&self) -> &str {
        &self.skip_directive
    }

    /// validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.skip_directive.trim().is_empty() {
            return Err(Error::Config("skip directive cannot be empty".to_string()));
        }

        if self.skip_directive.starts_with('@') {
            return Err(Error::Config(format!(
                "skip directive must be given without `@`: {}",
                self.skip_directive
            )));
        }

        for (graphql_type, target_type) in &self.type_mapping {
            if graphql_type.trim().is_empty() {
                return Err(Error::Config("type mapping key cannot be empty".to_string()));
            }
            if target_type.trim().is_empty() {
                return Err(Error::Config(format!(
                    "type mapping for `{graphql_type}` has an empty target"
                )));
            }
        }

        if !(self.include_queries || self.include_mutations || self.include_subscriptions) {
            return Err(Error::Config(
                "at least one operation kind must be enabled".to_string(),
            ));
        }

        Ok(())
    }
}
