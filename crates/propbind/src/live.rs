//! Layered files plus a mutable override layer, bound through one binder.

use log::{debug, info};
use propbind_core::{ConfigBinder, ConfigSchema, ConfigType, DecoderRegistry, Property, SchemaError};
use propbind_source::{
    CompositeSource, ConfigLayer, ConfigSource, LayeredSourceOptions, SettableSource, SourceError,
    load_layered_source_with_options,
};
use std::sync::Arc;

/// Name of the override layer stacked above every file layer.
pub const OVERRIDES_LAYER: &str = "overrides";

/// Live configuration: file layers under a settable override layer.
///
/// Instances bound through [`LiveConfig`] observe override changes on the
/// next accessor call.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    source: CompositeSource,
    overrides: SettableSource,
    layers: Vec<ConfigLayer>,
    binder: ConfigBinder,
}

impl LiveConfig {
    /// Load file layers with the built-in decoders.
    pub fn load(options: LayeredSourceOptions) -> Result<Self, SourceError> {
        Self::load_with_decoders(options, DecoderRegistry::new())
    }

    /// Load file layers and bind with a custom decoder registry.
    pub fn load_with_decoders(
        options: LayeredSourceOptions,
        decoders: DecoderRegistry,
    ) -> Result<Self, SourceError> {
        let layered = load_layered_source_with_options(options)?;
        info!("live config loaded (file_layers={})", layered.layers.len());
        Ok(Self::from_parts(layered.source, layered.layers, decoders))
    }

    /// Stack the override layer over an existing composite.
    pub fn from_source(source: CompositeSource) -> Self {
        Self::from_parts(source, Vec::new(), DecoderRegistry::new())
    }

    fn from_parts(
        mut source: CompositeSource,
        layers: Vec<ConfigLayer>,
        decoders: DecoderRegistry,
    ) -> Self {
        let overrides = SettableSource::new();
        source.push_highest(OVERRIDES_LAYER, Arc::new(overrides.clone()));
        let binder = ConfigBinder::builder(Arc::new(source.clone()))
            .decoders(decoders)
            .build();
        Self {
            source,
            overrides,
            layers,
            binder,
        }
    }

    /// The override layer; changes apply to every bound instance.
    pub fn overrides(&self) -> &SettableSource {
        &self.overrides
    }

    /// Apply a `key=value` override.
    pub fn apply_override(&self, assignment: &str) -> Result<(), SourceError> {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            SourceError::Invalid(format!("expected key=value, got {assignment:?}"))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(SourceError::Invalid(format!(
                "empty key in override {assignment:?}"
            )));
        }
        debug!("applying override (key={key})");
        self.overrides.set_property(key, value);
        Ok(())
    }

    /// File layers loaded, lowest precedence first.
    pub fn layers(&self) -> &[ConfigLayer] {
        &self.layers
    }

    /// Full layer stack, including the override layer.
    pub fn source(&self) -> &CompositeSource {
        &self.source
    }

    /// Layer currently supplying `key`.
    pub fn origin_of(&self, key: &str) -> Option<&str> {
        self.source.origin_of(key)
    }

    pub fn binder(&self) -> &ConfigBinder {
        &self.binder
    }

    pub fn bind<S: ConfigSchema>(&self) -> Result<S, SchemaError> {
        self.binder.bind::<S>()
    }

    pub fn bind_with_prefix<S: ConfigSchema>(&self, prefix: &str) -> Result<S, SchemaError> {
        self.binder.bind_with_prefix::<S>(prefix)
    }

    pub fn property<T: ConfigType>(&self, key: impl Into<String>) -> Property<T> {
        self.binder.property(key)
    }

    /// Whether any layer defines `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.source.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use propbind_source::MapSource;

    fn live() -> LiveConfig {
        LiveConfig::from_source(CompositeSource::new().with_layer(
            "defaults",
            Arc::new(MapSource::new().with_property("server.port", 80)),
        ))
    }

    #[test]
    fn overrides_sit_above_file_layers() {
        let live = live();
        let port = live.property::<u16>("server.port");
        assert_eq!(port.get(), Ok(80));
        assert_eq!(live.origin_of("server.port"), Some("defaults"));

        live.apply_override("server.port=8080").expect("override");
        assert_eq!(port.get(), Ok(8080));
        assert_eq!(live.origin_of("server.port"), Some(OVERRIDES_LAYER));
        assert_eq!(live.source().layer_names(), vec![OVERRIDES_LAYER, "defaults"]);
    }

    #[test]
    fn malformed_overrides_are_rejected() {
        let live = live();
        assert!(matches!(
            live.apply_override("server.port"),
            Err(SourceError::Invalid(_))
        ));
        assert!(matches!(
            live.apply_override(" =1"),
            Err(SourceError::Invalid(_))
        ));
        assert!(!live.overrides().contains_key(""));
    }

    #[test]
    fn values_keep_everything_after_first_equals() {
        let live = live();
        live.apply_override("banner=a=b").expect("override");
        assert_eq!(live.overrides().get("banner").as_deref(), Some("a=b"));
    }
}
