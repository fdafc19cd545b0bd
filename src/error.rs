//! error types
//!
//! structured errors for schema loading, traversal, and configuration.

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// error type for schema loading and projection generation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    SchemaParse(#[from] graphql_parser::schema::ParseError),

    #[error(transparent)]
    QueryParse(#[from] graphql_parser::query::ParseError),

    #[error("field `{owner}.{field}` references unknown type `{type_name}`")]
    UnresolvedType {
        /// type declaring the field
        owner: String,
        /// offending field name
        field: String,
        /// innermost named type of the field
        type_name: String,
    },

    #[error("malformed key selection on `{entity}` ({selection:?}): {reason}")]
    MalformedKeySelection {
        /// entity type carrying the key directive
        entity: String,
        /// raw `fields` argument
        selection: String,
        /// what went wrong while parsing
        reason: String,
    },

    #[error("operation selects unknown root field `{operation}.{field}`")]
    UnknownOperationField {
        /// root operation type name
        operation: String,
        /// selected field name
        field: String,
    },

    #[error("name allocator handed out `{0}` twice")]
    NameCollision(String),

    #[error("schema fetch failed with status {status}")]
    SchemaFetch {
        /// http status
        status: u16,
        /// raw response body
        body: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// true if the error was caused by the schema or operation documents
    /// rather than the environment
    pub fn is_fatal_schema_error(&self) -> bool {
        matches!(
            self,
            Error::SchemaParse(_)
                | Error::QueryParse(_)
                | Error::UnresolvedType { .. }
                | Error::MalformedKeySelection { .. }
                | Error::UnknownOperationField { .. }
        )
    }

    pub(crate) fn malformed_key(
        entity: impl Into<String>,
        selection: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::MalformedKeySelection {
            entity: entity.into(),
            selection: selection.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_fatal_schema_error() {
        let err = Error::UnresolvedType {
            owner: "Query".to_string(),
            field: "shows".to_string(),
            type_name: "Show".to_string(),
        };
        assert!(err.is_fatal_schema_error());

        let err = Error::malformed_key("Movie", "id {", "unclosed `{`");
        assert!(err.is_fatal_schema_error());

        let err = Error::Config("bad".to_string());
        assert!(!err.is_fatal_schema_error());

        let err = Error::SchemaFetch {
            status: 500,
            body: String::new(),
        };
        assert!(!err.is_fatal_schema_error());
    }

    #[test]
    fn test_unresolved_type_message() {
        let err = Error::UnresolvedType {
            owner: "Query".to_string(),
            field: "shows".to_string(),
            type_name: "Show".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "field `Query.shows` references unknown type `Show`"
        );
    }
}
