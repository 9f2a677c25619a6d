//! Live lookup of a single key with default fallback.

use crate::decoder::DecoderRegistry;
use crate::error::ResolveError;
use crate::value::{Value, ValueType};
use log::{debug, trace};
use propbind_source::ConfigSource;

/// Resolves keys against a source on every call; nothing is cached.
#[derive(Clone, Copy)]
pub struct PropertyResolver<'a> {
    source: &'a dyn ConfigSource,
    decoders: &'a DecoderRegistry,
}

impl<'a> PropertyResolver<'a> {
    pub fn new(source: &'a dyn ConfigSource, decoders: &'a DecoderRegistry) -> Self {
        Self { source, decoders }
    }

    /// Resolve a required value.
    ///
    /// The source value wins; otherwise the default literal is decoded with the
    /// same rules. With neither, the call fails with [`ResolveError::MissingValue`].
    pub fn resolve(
        &self,
        key: &str,
        target: &ValueType,
        default: Option<&str>,
    ) -> Result<Value, ResolveError> {
        self.resolve_optional(key, target, default)?
            .ok_or_else(|| ResolveError::MissingValue {
                key: key.to_string(),
            })
    }

    /// Resolve a value that may be absent; `None` when no layer and no default supply it.
    pub fn resolve_optional(
        &self,
        key: &str,
        target: &ValueType,
        default: Option<&str>,
    ) -> Result<Option<Value>, ResolveError> {
        if let Some(raw) = self.source.get(key) {
            trace!("resolved key from source (key={key}, type={})", target.name());
            return self.decode(key, &raw, target).map(Some);
        }
        match default {
            Some(literal) => {
                debug!("key absent; using default (key={key}, default={literal})");
                self.decode(key, literal, target).map(Some)
            }
            None => {
                trace!("key absent with no default (key={key})");
                Ok(None)
            }
        }
    }

    fn decode(&self, key: &str, raw: &str, target: &ValueType) -> Result<Value, ResolveError> {
        self.decoders
            .decode(raw, target)
            .map_err(|source| ResolveError::Decode {
                key: key.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use pretty_assertions::assert_eq;
    use propbind_source::{EmptySource, MapSource, SettableSource};

    #[test]
    fn source_value_overrides_default() {
        let source = MapSource::new().with_property("port", 8080);
        let decoders = DecoderRegistry::new();
        let resolver = PropertyResolver::new(&source, &decoders);
        assert_eq!(
            resolver.resolve("port", &ValueType::U16, Some("80")),
            Ok(Value::U16(8080))
        );
    }

    #[test]
    fn default_applies_when_absent() {
        let decoders = DecoderRegistry::new();
        let resolver = PropertyResolver::new(&EmptySource, &decoders);
        assert_eq!(
            resolver.resolve("port", &ValueType::U16, Some("80")),
            Ok(Value::U16(80))
        );
        assert_eq!(
            resolver.resolve_optional("port", &ValueType::U16, None),
            Ok(None)
        );
    }

    #[test]
    fn missing_value_names_the_key() {
        let decoders = DecoderRegistry::new();
        let resolver = PropertyResolver::new(&EmptySource, &decoders);
        assert_eq!(
            resolver.resolve("server.port", &ValueType::U16, None),
            Err(ResolveError::MissingValue {
                key: "server.port".to_string()
            })
        );
    }

    #[test]
    fn decode_failures_propagate_instead_of_defaulting() {
        let source = MapSource::new().with_property("port", "eighty");
        let decoders = DecoderRegistry::new();
        let resolver = PropertyResolver::new(&source, &decoders);
        let err = resolver
            .resolve("port", &ValueType::U16, Some("80"))
            .unwrap_err();
        match err {
            ResolveError::Decode { key, source } => {
                assert_eq!(key, "port");
                assert!(matches!(source, DecodeError::InvalidValue { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn every_call_reads_the_current_value() {
        let source = SettableSource::new();
        let decoders = DecoderRegistry::new();
        let resolver = PropertyResolver::new(&source, &decoders);

        assert_eq!(
            resolver.resolve("name", &ValueType::String, Some("fallback")),
            Ok(Value::String("fallback".to_string()))
        );
        source.set_property("name", "live");
        assert_eq!(
            resolver.resolve("name", &ValueType::String, Some("fallback")),
            Ok(Value::String("live".to_string()))
        );
    }
}
