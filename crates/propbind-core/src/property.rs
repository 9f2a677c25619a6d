//! Typed handle for one key outside any schema.

use crate::binder::BindContext;
use crate::error::ResolveError;
use crate::resolver::PropertyResolver;
use crate::typed::ConfigType;
use crate::value::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A single live, typed key.
///
/// Like schema accessors, every [`get`](Self::get) reads the source anew.
pub struct Property<T> {
    context: Arc<BindContext>,
    key: String,
    default: Option<String>,
    _type: PhantomData<fn() -> T>,
}

impl<T: ConfigType> Property<T> {
    pub(crate) fn new(context: Arc<BindContext>, key: String) -> Self {
        Self {
            context,
            key,
            default: None,
            _type: PhantomData,
        }
    }

    /// Default literal used while the key is unset. Decoded on each read.
    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether any layer currently defines the key.
    pub fn is_set(&self) -> bool {
        self.context.source.contains_key(&self.key)
    }

    /// Current value.
    pub fn get(&self) -> Result<T, ResolveError> {
        let resolver = PropertyResolver::new(self.context.source.as_ref(), &self.context.decoders);
        let target = T::value_type();
        let default = self.default.as_deref();
        let value = if T::NULLABLE {
            resolver
                .resolve_optional(&self.key, &target, default)?
                .unwrap_or(Value::Null)
        } else {
            resolver.resolve(&self.key, &target, default)?
        };
        T::from_value(value).map_err(|found| ResolveError::TypeMismatch {
            key: self.key.clone(),
            expected: target.name(),
            found: found.kind(),
        })
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            key: self.key.clone(),
            default: self.default.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("key", &self.key)
            .field("default", &self.default)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::binder::ConfigBinder;
    use crate::error::ResolveError;
    use pretty_assertions::assert_eq;
    use propbind_source::SettableSource;
    use std::sync::Arc;

    #[test]
    fn property_reads_live_values() {
        let source = SettableSource::new();
        let binder = ConfigBinder::new(Arc::new(source.clone()));
        let workers = binder.property::<u32>("pool.workers").with_default("4");

        assert!(!workers.is_set());
        assert_eq!(workers.get(), Ok(4));
        source.set_property("pool.workers", 16);
        assert!(workers.is_set());
        assert_eq!(workers.get(), Ok(16));
    }

    #[test]
    fn optional_and_required_properties() {
        let binder = ConfigBinder::new(Arc::new(SettableSource::new()));
        assert_eq!(binder.property::<Option<String>>("name").get(), Ok(None));
        assert_eq!(
            binder.property::<String>("name").get(),
            Err(ResolveError::MissingValue {
                key: "name".to_string()
            })
        );
    }

    #[test]
    fn list_properties_split_on_commas() {
        let source = SettableSource::new();
        source.set_property("hosts", "a, b,c");
        let binder = ConfigBinder::new(Arc::new(source));
        assert_eq!(
            binder.property::<Vec<String>>("hosts").get(),
            Ok(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }
}
