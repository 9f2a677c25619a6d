//! The configuration source contract and the simple in-memory sources.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Key/value lookup consumed by bound configuration facades.
///
/// `get` must return the value that is effective *now*; implementations that
/// are layered or mutable are expected to answer every call from live state.
pub trait ConfigSource: Send + Sync {
    /// Current raw value for `key`, or `None` when no layer defines it.
    fn get(&self, key: &str) -> Option<String>;

    /// Whether any layer currently defines `key`.
    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// All keys currently known to the source, sorted.
    fn keys(&self) -> Vec<String>;

    /// Whether the source currently holds no keys at all.
    fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn contains_key(&self, key: &str) -> bool {
        (**self).contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }
}

/// A source with no keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySource;

impl ConfigSource for EmptySource {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn contains_key(&self, _key: &str) -> bool {
        false
    }

    fn keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn is_empty(&self) -> bool {
        true
    }
}

/// Immutable source backed by a sorted map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSource {
    values: BTreeMap<String, String>,
}

impl MapSource {
    /// Create an empty map source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property while building the source.
    pub fn with_property(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.values.insert(key.into(), value.to_string());
        self
    }

    /// Number of properties held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn from_map(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

impl<K, V> FromIterator<(K, V)> for MapSource
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.to_string()))
                .collect(),
        }
    }
}

impl ConfigSource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
