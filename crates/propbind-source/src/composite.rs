//! Ordered stack of named sources.

use crate::ConfigSource;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Layered source where the first layer holding a key wins.
///
/// Layers are kept highest precedence first. Lookups walk the stack on every
/// call, so mutations in any layer are visible immediately.
#[derive(Clone, Default)]
pub struct CompositeSource {
    layers: Vec<(String, Arc<dyn ConfigSource>)>,
}

impl CompositeSource {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer below every existing layer.
    pub fn with_layer(mut self, name: impl Into<String>, source: Arc<dyn ConfigSource>) -> Self {
        self.push_lowest(name, source);
        self
    }

    /// Add a layer with lower precedence than every existing layer.
    pub fn push_lowest(&mut self, name: impl Into<String>, source: Arc<dyn ConfigSource>) {
        self.layers.push((name.into(), source));
    }

    /// Add a layer with higher precedence than every existing layer.
    pub fn push_highest(&mut self, name: impl Into<String>, source: Arc<dyn ConfigSource>) {
        self.layers.insert(0, (name.into(), source));
    }

    /// Layer names, highest precedence first.
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Look up a layer by name.
    pub fn layer(&self, name: &str) -> Option<Arc<dyn ConfigSource>> {
        self.layers
            .iter()
            .find(|(layer_name, _)| layer_name == name)
            .map(|(_, source)| Arc::clone(source))
    }

    /// Name of the layer currently supplying `key`.
    pub fn origin_of(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .find(|(_, source)| source.contains_key(key))
            .map(|(name, _)| name.as_str())
    }
}

impl fmt::Debug for CompositeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeSource")
            .field("layers", &self.layer_names())
            .finish()
    }
}

impl ConfigSource for CompositeSource {
    fn get(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|(_, source)| source.get(key))
    }

    fn contains_key(&self, key: &str) -> bool {
        self.layers.iter().any(|(_, source)| source.contains_key(key))
    }

    fn keys(&self) -> Vec<String> {
        self.layers
            .iter()
            .flat_map(|(_, source)| source.keys())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MapSource, SettableSource};
    use pretty_assertions::assert_eq;

    #[test]
    fn highest_layer_wins_and_falls_through() {
        let overrides = SettableSource::new();
        let defaults = MapSource::new()
            .with_property("http.port", 80)
            .with_property("http.host", "localhost");

        let composite = CompositeSource::new()
            .with_layer("override", Arc::new(overrides.clone()))
            .with_layer("defaults", Arc::new(defaults));

        assert_eq!(composite.get("http.port").as_deref(), Some("80"));
        assert_eq!(composite.origin_of("http.port"), Some("defaults"));

        overrides.set_property("http.port", 8080);
        assert_eq!(composite.get("http.port").as_deref(), Some("8080"));
        assert_eq!(composite.origin_of("http.port"), Some("override"));
        assert_eq!(composite.get("http.host").as_deref(), Some("localhost"));

        overrides.clear_property("http.port");
        assert_eq!(composite.get("http.port").as_deref(), Some("80"));
    }

    #[test]
    fn keys_are_sorted_union() {
        let mut composite = CompositeSource::new()
            .with_layer("a", Arc::new(MapSource::new().with_property("x", 1)));
        composite.push_highest(
            "b",
            Arc::new(MapSource::new().with_property("x", 2).with_property("w", 3)),
        );

        assert_eq!(composite.layer_names(), vec!["b", "a"]);
        assert_eq!(composite.keys(), vec!["w", "x"]);
        assert_eq!(composite.get("x").as_deref(), Some("2"));
        assert!(composite.layer("a").is_some());
        assert!(composite.layer("missing").is_none());
    }
}
