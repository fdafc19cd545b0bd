//! projection name allocation
//!
//! names are a pure function of the traversal path plus a suffix. the
//! allocator remembers every name it handed out so two different paths can
//! never end up with the same class name, and tracks which names have been
//! emitted so each path is generated at most once per run.

use std::collections::{HashMap, HashSet};

/// segment length used by shortened names
pub const SHORT_SEGMENT_LEN: usize = 3;

/// class name suffixes
pub const ROOT_SUFFIX: &str = "ProjectionRoot";
pub const PROJECTION_SUFFIX: &str = "Projection";
pub const REPRESENTATION_SUFFIX: &str = "Representation";
pub const QUERY_SUFFIX: &str = "GraphQLQuery";

/// run-wide name allocator
#[derive(Debug, Default)]
pub struct NameAllocator {
    short_names: bool,
    /// path key -> allocated name
    allocated: HashMap<String, String>,
    /// allocated name -> owning path key
    owners: HashMap<String, String>,
    reserved: HashSet<String>,
}

impl NameAllocator {
    pub fn new(short_names: bool) -> Self {
        Self {
            short_names,
            ..Self::default()
        }
    }

    /// name for a path; identical paths always get identical names
    ///
    /// ```
    /// use projection_codegen::NameAllocator;
    ///
    /// let mut names = NameAllocator::new(false);
    /// let name = names.allocate(&["persons", "friends"], "Projection");
    /// assert_eq!(name, "PersonsFriendsProjection");
    /// assert_eq!(names.allocate(&["persons", "friends"], "Projection"), name);
    /// ```
    pub fn allocate<S: AsRef<str>>(&mut self, path: &[S], suffix: &str) -> String {
        let key = path_key(path, suffix);
        if let Some(name) = self.allocated.get(&key) {
            return name.clone();
        }

        let base = self.base_name(path);
        let mut candidate = format!("{base}{suffix}");
        let mut counter = 2;
        while self.owners.contains_key(&candidate) {
            candidate = format!("{base}{counter}{suffix}");
            counter += 1;
        }
        if counter > 2 {
            tracing::debug!(name = %candidate, path = %key, "disambiguated colliding projection name");
        }

        self.owners.insert(candidate.clone(), key.clone());
        self.allocated.insert(key, candidate.clone());
        candidate
    }

    /// mark a name as emitted; false if it already was
    pub fn try_reserve(&mut self, name: &str) -> bool {
        self.reserved.insert(name.to_string())
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    pub fn reserved_count(&self) -> usize {
        self.reserved.len()
    }

    fn base_name<S: AsRef<str>>(&self, path: &[S]) -> String {
        let last = path.len().saturating_sub(1);
        path.iter()
            .enumerate()
            .map(|(idx, segment)| {
                let segment = capitalize(segment.as_ref());
                if self.short_names && idx < last {
                    segment.chars().take(SHORT_SEGMENT_LEN).collect()
                } else {
                    segment
                }
            })
            .collect()
    }
}

fn path_key<S: AsRef<str>>(path: &[S], suffix: &str) -> String {
    let mut key = path
        .iter()
        .map(|segment| segment.as_ref())
        .collect::<Vec<_>>()
        .join("/");
    key.push('#');
    key.push_str(suffix);
    key
}

/// upper-case the first character
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
