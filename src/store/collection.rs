//! Collections of text alternatives and the name-indexed set of them

use std::collections::BTreeMap;
use std::sync::Arc;

use globset::{GlobBuilder, GlobMatcher};

/// One candidate substitution for a wildcard
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub text: String,
    /// Relative sampling weight; `None` counts as 1.0
    pub weight: Option<f64>,
}

impl Alternative {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: None,
        }
    }

    pub fn weighted(text: impl Into<String>, weight: f64) -> Self {
        Self {
            text: text.into(),
            weight: Some(weight),
        }
    }
}

/// An immutable named list of alternatives
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    name: String,
    alternatives: Vec<Alternative>,
}

impl Collection {
    pub fn new(name: impl Into<String>, alternatives: Vec<Alternative>) -> Self {
        Self {
            name: name.into(),
            alternatives,
        }
    }

    /// Build an unweighted collection from plain strings
    pub fn from_texts<I, S>(name: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, texts.into_iter().map(Alternative::new).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Whether any alternative carries an explicit weight
    pub fn is_weighted(&self) -> bool {
        self.alternatives.iter().any(|a| a.weight.is_some())
    }
}

/// Name-indexed collections, iterated in name order
#[derive(Debug, Clone, Default)]
pub struct Collections {
    by_name: BTreeMap<String, Arc<Collection>>,
}

impl Collections {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a collection, replacing any previous one with the same name
    pub fn insert(&mut self, collection: Collection) -> Option<Arc<Collection>> {
        self.by_name
            .insert(collection.name.clone(), Arc::new(collection))
    }

    /// Get a collection by exact name
    pub fn get(&self, name: &str) -> Option<&Arc<Collection>> {
        self.by_name.get(name)
    }

    /// Check if a collection exists
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All collection names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Collection>> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Collections whose names match a glob pattern such as `animals/*`
    ///
    /// `*` and `?` stay within one path segment; `**` crosses segments. An invalid
    /// pattern matches nothing.
    pub fn matching(&self, pattern: &str) -> Vec<&Arc<Collection>> {
        let Some(matcher) = compile_glob(pattern) else {
            return Vec::new();
        };
        self.by_name
            .iter()
            .filter(|(name, _)| matcher.is_match(name.as_str()))
            .map(|(_, collection)| collection)
            .collect()
    }
}

impl FromIterator<Collection> for Collections {
    fn from_iter<I: IntoIterator<Item = Collection>>(iter: I) -> Self {
        let mut collections = Self::new();
        for collection in iter {
            collections.insert(collection);
        }
        collections
    }
}

/// Whether a wildcard name should be treated as a glob pattern
pub fn is_glob(name: &str) -> bool {
    name.contains(['*', '?'])
}

fn compile_glob(pattern: &str) -> Option<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .ok()
        .map(|glob| glob.compile_matcher())
}
