use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

/// An ordered collection of unique parameter names.
///
/// Insertion order is preserved: a name keeps the position of its first
/// occurrence, later duplicates are dropped. Empty names are rejected.
#[derive(Debug, Clone, Default)]
pub struct ParamSet {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a name, returning true if it was not already present.
    ///
    /// Empty names are ignored and return false.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.is_empty() || self.seen.contains(&name) {
            return false;
        }
        self.seen.insert(name.clone());
        self.names.push(name);
        true
    }

    /// Merges every name from `iter`, keeping first-seen order.
    pub fn extend<I, S>(&mut self, iter: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in iter {
            self.insert(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.names.clone()
    }

    /// Returns only the names matching `pattern`, preserving order.
    pub fn filtered(&self, pattern: &Regex) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| pattern.is_match(name))
            .cloned()
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for ParamSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ParamSet::new();
        set.extend(iter);
        set
    }
}

impl From<Vec<String>> for ParamSet {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

// Stored as a plain JSON array so store entries stay readable.
impl Serialize for ParamSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.names.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParamSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(ParamSet::from(names))
    }
}
