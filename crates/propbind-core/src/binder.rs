//! Binding schemas to a configuration source.
//!
//! Binding validates the schema shape once (inheritance, key uniqueness,
//! decodability of every declared type and default) and builds a dispatch
//! table of accessor -> (key, type, default). It never reads the source, so
//! missing values can only fail later, when an accessor is invoked.

use crate::bound::BoundInstance;
use crate::decoder::DecoderRegistry;
use crate::error::SchemaError;
use crate::key::KeyNaming;
use crate::property::Property;
use crate::schema::{ConfigSchema, Schema};
use crate::typed::ConfigType;
use crate::value::ValueType;
use log::debug;
use propbind_source::ConfigSource;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Shared state behind a binder and every instance it produces.
pub(crate) struct BindContext {
    pub(crate) source: Arc<dyn ConfigSource>,
    pub(crate) decoders: DecoderRegistry,
    pub(crate) naming: KeyNaming,
}

/// Accessor entry of a dispatch table.
#[derive(Debug)]
pub(crate) struct PlannedAccessor {
    pub(crate) name: String,
    pub(crate) token: String,
    pub(crate) value_type: ValueType,
    pub(crate) default: Option<String>,
    pub(crate) nullable: bool,
    /// Plan of a nested schema, filled at bind time or on first use.
    pub(crate) nested: OnceLock<Arc<SchemaPlan>>,
}

/// Flattened schema with field tokens derived.
#[derive(Debug)]
pub(crate) struct SchemaPlan {
    pub(crate) name: String,
    pub(crate) accessors: Vec<PlannedAccessor>,
}

impl SchemaPlan {
    pub(crate) fn build(schema: &Schema, naming: KeyNaming) -> Result<Self, SchemaError> {
        let accessors = schema.accessors()?;
        let mut owners: HashMap<String, String> = HashMap::with_capacity(accessors.len());
        let mut planned = Vec::with_capacity(accessors.len());

        for accessor in accessors {
            let token = match accessor.key_override() {
                Some(token) => token.to_string(),
                None => naming.field_token(accessor.name()),
            };
            if let Some(first) = owners.insert(token.clone(), accessor.name().to_string()) {
                return Err(SchemaError::DuplicateKey {
                    schema: schema.name().to_string(),
                    key: token,
                    first,
                    second: accessor.name().to_string(),
                });
            }
            planned.push(PlannedAccessor {
                name: accessor.name().to_string(),
                token,
                value_type: accessor.value_type().clone(),
                default: accessor.default_literal().map(str::to_string),
                nullable: accessor.is_nullable(),
                nested: OnceLock::new(),
            });
        }

        Ok(Self {
            name: schema.name().to_string(),
            accessors: planned,
        })
    }

    pub(crate) fn position(&self, accessor: &str) -> Option<usize> {
        self.accessors
            .iter()
            .position(|planned| planned.name == accessor)
    }
}

/// Entry point producing live, typed views over a configuration source.
#[derive(Clone)]
pub struct ConfigBinder {
    context: Arc<BindContext>,
}

impl ConfigBinder {
    /// Binder with the built-in decoders and getter key naming.
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self::builder(source).build()
    }

    pub fn builder(source: Arc<dyn ConfigSource>) -> ConfigBinderBuilder {
        ConfigBinderBuilder {
            source,
            decoders: DecoderRegistry::new(),
            naming: KeyNaming::default(),
        }
    }

    pub fn source(&self) -> &Arc<dyn ConfigSource> {
        &self.context.source
    }

    pub fn decoders(&self) -> &DecoderRegistry {
        &self.context.decoders
    }

    pub fn naming(&self) -> KeyNaming {
        self.context.naming
    }

    /// Bind a schema under an optional prefix.
    ///
    /// Without an explicit prefix the schema's declared prefix applies.
    pub fn bind_schema(
        &self,
        schema: &Schema,
        prefix: Option<&str>,
    ) -> Result<BoundInstance, SchemaError> {
        let plan = self.validate_schema(schema, &mut HashSet::from([schema.identity()]))?;
        let prefix = prefix
            .or(schema.prefix())
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_string);
        debug!(
            "bound schema (schema={}, prefix={}, accessors={})",
            plan.name,
            prefix.as_deref().unwrap_or("<none>"),
            plan.accessors.len()
        );
        Ok(BoundInstance::new(
            Arc::clone(&self.context),
            Arc::new(plan),
            prefix,
        ))
    }

    /// Bind a typed facade at its declared prefix (or none).
    pub fn bind<S: ConfigSchema>(&self) -> Result<S, SchemaError> {
        self.bind_schema(&S::schema(), None).map(S::from_bound)
    }

    /// Bind a typed facade under `prefix`.
    pub fn bind_with_prefix<S: ConfigSchema>(&self, prefix: &str) -> Result<S, SchemaError> {
        self.bind_schema(&S::schema(), Some(prefix))
            .map(S::from_bound)
    }

    /// Check a schema (and every schema nested in it) without binding.
    pub fn validate(&self, schema: &Schema) -> Result<(), SchemaError> {
        self.validate_schema(schema, &mut HashSet::from([schema.identity()]))
            .map(|_| ())
    }

    /// Typed handle for a single key.
    pub fn property<T: ConfigType>(&self, key: impl Into<String>) -> Property<T> {
        Property::new(Arc::clone(&self.context), key.into())
    }

    /// `visited` holds the identities of schemas already validated in this
    /// bind; names are not unique, identities are.
    fn validate_schema(
        &self,
        schema: &Schema,
        visited: &mut HashSet<usize>,
    ) -> Result<SchemaPlan, SchemaError> {
        let plan = SchemaPlan::build(schema, self.context.naming)?;
        let decoders = &self.context.decoders;

        for accessor in &plan.accessors {
            match &accessor.value_type {
                ValueType::Schema(nested) => {
                    if accessor.default.is_some() {
                        return Err(SchemaError::DefaultOnNested {
                            schema: plan.name.clone(),
                            accessor: accessor.name.clone(),
                        });
                    }
                    if visited.insert(nested.identity()) {
                        let nested_plan = self.validate_schema(&nested.schema(), visited)?;
                        let _ = accessor.nested.set(Arc::new(nested_plan));
                    }
                }
                value_type => {
                    if !decoders.supports(value_type) {
                        return Err(SchemaError::UnsupportedType {
                            schema: plan.name.clone(),
                            accessor: accessor.name.clone(),
                            type_name: value_type.name(),
                        });
                    }
                    if let Some(default) = &accessor.default {
                        decoders.decode(default, value_type).map_err(|source| {
                            SchemaError::InvalidDefault {
                                schema: plan.name.clone(),
                                accessor: accessor.name.clone(),
                                source,
                            }
                        })?;
                    }
                }
            }
        }
        Ok(plan)
    }
}

impl fmt::Debug for ConfigBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBinder")
            .field("decoders", &self.context.decoders)
            .field("naming", &self.context.naming)
            .finish()
    }
}

/// Builder for [`ConfigBinder`].
pub struct ConfigBinderBuilder {
    source: Arc<dyn ConfigSource>,
    decoders: DecoderRegistry,
    naming: KeyNaming,
}

impl ConfigBinderBuilder {
    /// Replace the decoder registry.
    pub fn decoders(mut self, decoders: DecoderRegistry) -> Self {
        self.decoders = decoders;
        self
    }

    /// Replace the key naming rule.
    pub fn naming(mut self, naming: KeyNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn build(self) -> ConfigBinder {
        ConfigBinder {
            context: Arc::new(BindContext {
                source: self.source,
                decoders: self.decoders,
                naming: self.naming,
            }),
        }
    }
}
