//! Mutable in-memory source for runtime overrides.

use crate::ConfigSource;
use log::debug;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared, mutable property store.
///
/// Clones share the same underlying map, so a handle kept by the application
/// can update values that bound facades observe on their next lookup.
#[derive(Debug, Clone, Default)]
pub struct SettableSource {
    values: Arc<RwLock<BTreeMap<String, String>>>,
}

impl SettableSource {
    /// Create an empty settable source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace a property.
    pub fn set_property(&self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        debug!("setting property (key={key}, value={value})");
        self.values.write().insert(key, value);
    }

    /// Remove a property, returning the previous value if any.
    pub fn clear_property(&self, key: &str) -> Option<String> {
        debug!("clearing property (key={key})");
        self.values.write().remove(key)
    }

    /// Copy every property of another source into this one.
    ///
    /// `source` is read before the write lock is taken, so it may be this
    /// source or a composite layering it.
    pub fn set_properties(&self, source: &dyn ConfigSource) {
        let copied: Vec<(String, String)> = source
            .keys()
            .into_iter()
            .filter_map(|key| source.get(&key).map(|value| (key, value)))
            .collect();
        debug!("copying properties (count={})", copied.len());
        self.values.write().extend(copied);
    }

    /// Remove every property.
    pub fn clear(&self) {
        self.values.write().clear();
    }
}

impl ConfigSource for SettableSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }

    fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompositeSource, MapSource};
    use pretty_assertions::assert_eq;

    #[test]
    fn clones_share_updates() {
        let source = SettableSource::new();
        let handle = source.clone();

        handle.set_property("pool.size", 4);
        assert_eq!(source.get("pool.size").as_deref(), Some("4"));

        handle.set_property("pool.size", 8);
        assert_eq!(source.get("pool.size").as_deref(), Some("8"));

        assert_eq!(handle.clear_property("pool.size").as_deref(), Some("8"));
        assert_eq!(source.get("pool.size"), None);
    }

    #[test]
    fn copies_properties_from_other_sources() {
        let source = SettableSource::new();
        source.set_properties(&MapSource::new().with_property("a", 1).with_property("b", 2));
        assert_eq!(source.keys(), vec!["a", "b"]);

        source.clear();
        assert!(source.is_empty());
    }

    #[test]
    fn copies_from_a_composite_layering_itself() {
        let source = SettableSource::new();
        source.set_property("a", 1);
        let composite = CompositeSource::new()
            .with_layer("settable", Arc::new(source.clone()))
            .with_layer("defaults", Arc::new(MapSource::new().with_property("b", 2)));

        source.set_properties(&composite);
        source.set_properties(&source.clone());
        assert_eq!(source.keys(), vec!["a", "b"]);
        assert_eq!(source.get("b").as_deref(), Some("2"));
    }
}
