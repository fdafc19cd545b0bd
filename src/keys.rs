//! federation key selections
//!
//! parses the `fields` argument of `@key`, e.g. `"movieId actor { name }"`,
//! into a nested, ordered key tree.

use crate::error::{Error, Result};
use indexmap::IndexMap;

/// ordered key fields; a nested selection marks a composite key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySelection {
    fields: IndexMap<String, Option<KeySelection>>,
}

impl KeySelection {
    /// parse a key selection declared on `entity`
    ///
    /// ```
    /// use projection_codegen::KeySelection;
    ///
    /// let key = KeySelection::parse("Movie", "movieId actor { name }").unwrap();
    /// assert_eq!(key.field_names(), vec!["movieId", "actor"]);
    /// assert_eq!(key.nested("actor").unwrap().field_names(), vec!["name"]);
    /// ```
    pub fn parse(entity: &str, selection: &str) -> Result<Self> {
        let malformed = |reason: String| Error::malformed_key(entity, selection, reason);

        let mut stack: Vec<(String, KeySelection)> = Vec::new();
        let mut current = KeySelection::default();
        let mut last_field: Option<String> = None;

        for token in tokenize(selection) {
            match token {
                "{" => {
                    let field = last_field
                        .take()
                        .ok_or_else(|| malformed("`{` without a field before it".to_string()))?;
                    stack.push((field, std::mem::take(&mut current)));
                }
                "}" => {
                    let (field, mut parent) = stack
                        .pop()
                        .ok_or_else(|| malformed("unbalanced `}`".to_string()))?;
                    if current.fields.is_empty() {
                        return Err(malformed(format!("empty selection for `{field}`")));
                    }
                    parent.insert_nested(field, current);
                    current = parent;
                    last_field = None;
                }
                name => {
                    current.fields.entry(name.to_string()).or_insert(None);
                    last_field = Some(name.to_string());
                }
            }
        }

        if let Some((field, _)) = stack.last() {
            return Err(malformed(format!("unclosed `{{` after `{field}`")));
        }
        if current.fields.is_empty() {
            return Err(malformed("empty key selection".to_string()));
        }
        Ok(current)
    }

    /// merge several key selections, keeping first-seen order
    pub fn merged(selections: impl IntoIterator<Item = KeySelection>) -> Self {
        let mut merged = KeySelection::default();
        for selection in selections {
            merged.merge(selection);
        }
        merged
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// nested key selection under `field`, if it is composite
    pub fn nested(&self, field: &str) -> Option<&KeySelection> {
        self.fields.get(field).and_then(Option::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&KeySelection>)> {
        self.fields
            .iter()
            .map(|(name, nested)| (name.as_str(), nested.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn insert_nested(&mut self, field: String, nested: KeySelection) {
        let slot = self.fields.entry(field).or_insert(None);
        match slot {
            Some(existing) => existing.merge(nested),
            None => *slot = Some(nested),
        }
    }

    fn merge(&mut self, other: KeySelection) {
        for (field, nested) in other.fields {
            match nested {
                Some(nested) => self.insert_nested(field, nested),
                None => {
                    self.fields.entry(field).or_insert(None);
                }
            }
        }
    }
}

fn tokenize(selection: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (idx, ch) in selection.char_indices() {
        let is_separator = ch.is_whitespace() || ch == ',' || ch == '{' || ch == '}';
        if is_separator {
            if let Some(begin) = start.take() {
                tokens.push(&selection[begin..idx]);
            }
            if ch == '{' || ch == '}' {
                tokens.push(&selection[idx..idx + 1]);
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(begin) = start {
        tokens.push(&selection[begin..]);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("id"), vec!["id"]);
        assert_eq!(
            tokenize(" a b{c,d }"),
            vec!["a", "b", "{", "c", "d", "}"]
        );
    }

    #[test]
    fn test_parse_flat_and_nested() {
        let key = KeySelection::parse("Movie", "movieId actor { name address { city } } year").unwrap();
        assert_eq!(key.field_names(), vec!["movieId", "actor", "year"]);
        let actor = key.nested("actor").unwrap();
        assert_eq!(actor.field_names(), vec!["name", "address"]);
        assert_eq!(actor.nested("address").unwrap().field_names(), vec!["city"]);
        assert!(key.nested("movieId").is_none());
    }

    #[test]
    fn test_parse_malformed() {
        for selection in ["id {", "id }", "{ id }", "id { }", "", "a { b { c }"] {
            let err = KeySelection::parse("Movie", selection).unwrap_err();
            assert!(
                matches!(err, Error::MalformedKeySelection { ref entity, .. } if entity == "Movie"),
                "{selection:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_duplicate_fields_merge() {
        let key = KeySelection::parse("Movie", "actor { name } actor { id }").unwrap();
        assert_eq!(key.field_names(), vec!["actor"]);
        assert_eq!(key.nested("actor").unwrap().field_names(), vec!["name", "id"]);
    }

    #[test]
    fn test_merged() {
        let first = KeySelection::parse("Movie", "id").unwrap();
        let second = KeySelection::parse("Movie", "title studio { id }").unwrap();
        let merged = KeySelection::merged([first, second]);
        assert_eq!(merged.field_names(), vec!["id", "title", "studio"]);
        assert!(merged.nested("studio").is_some());
    }
}
