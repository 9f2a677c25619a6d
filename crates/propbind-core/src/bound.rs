//! Bound instances: live views of a schema over a source.

use crate::binder::{BindContext, SchemaPlan};
use crate::error::ResolveError;
use crate::key::derive_key;
use crate::resolver::PropertyResolver;
use crate::schema::ConfigSchema;
use crate::typed::ConfigType;
use crate::value::{Value, ValueType};
use log::trace;
use std::fmt;
use std::sync::Arc;

/// A schema bound to a source under a prefix.
///
/// Every accessor call reads the source at that moment; nothing is memoized,
/// so changes to the underlying layers are visible on the next call. Clones
/// share the same binding.
#[derive(Clone)]
pub struct BoundInstance {
    context: Arc<BindContext>,
    plan: Arc<SchemaPlan>,
    prefix: Option<String>,
    keys: Arc<[String]>,
}

impl BoundInstance {
    pub(crate) fn new(
        context: Arc<BindContext>,
        plan: Arc<SchemaPlan>,
        prefix: Option<String>,
    ) -> Self {
        let keys = plan
            .accessors
            .iter()
            .map(|accessor| derive_key(prefix.as_deref(), &accessor.token))
            .collect();
        Self {
            context,
            plan,
            prefix,
            keys,
        }
    }

    pub fn schema_name(&self) -> &str {
        &self.plan.name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Effective accessor names, ancestors' first.
    pub fn accessor_names(&self) -> Vec<&str> {
        self.plan
            .accessors
            .iter()
            .map(|accessor| accessor.name.as_str())
            .collect()
    }

    /// Full key an accessor reads.
    pub fn key_of(&self, accessor: &str) -> Option<&str> {
        self.plan
            .position(accessor)
            .map(|idx| self.keys[idx].as_str())
    }

    /// Current value of a value accessor.
    ///
    /// Nullable accessors yield [`Value::Null`] when neither a layer nor a
    /// default supplies the key.
    pub fn get(&self, accessor: &str) -> Result<Value, ResolveError> {
        let idx = self.lookup(accessor)?;
        self.resolve_at(idx)
    }

    /// Current value of a value accessor as a Rust type.
    pub fn get_as<T: ConfigType>(&self, accessor: &str) -> Result<T, ResolveError> {
        let idx = self.lookup(accessor)?;
        let value = self.resolve_at(idx)?;
        T::from_value(value).map_err(|found| ResolveError::TypeMismatch {
            key: self.keys[idx].clone(),
            expected: T::value_type().name(),
            found: found.kind(),
        })
    }

    /// Bind the nested schema of an accessor under that accessor's key.
    pub fn nested(&self, accessor: &str) -> Result<BoundInstance, ResolveError> {
        let idx = self.lookup(accessor)?;
        self.bind_nested(idx)
    }

    /// Typed form of [`nested`](Self::nested).
    pub fn nested_as<S: ConfigSchema>(&self, accessor: &str) -> Result<S, ResolveError> {
        self.nested(accessor).map(S::from_bound)
    }

    /// Every value reachable from this instance as `(key, value)` pairs, in
    /// accessor order with nested schemas expanded in place.
    ///
    /// A nested schema already being expanded further up is skipped.
    pub fn snapshot(&self) -> Result<Vec<(String, Value)>, ResolveError> {
        let mut entries = Vec::with_capacity(self.keys.len());
        self.snapshot_into(&mut entries, &mut Vec::new())?;
        Ok(entries)
    }

    /// Render current values as `Name[key=value, ...]`; nested schemas
    /// render recursively in place of their value, except a schema already
    /// being rendered further up, which renders as `Name[...]`.
    pub fn render(&self) -> Result<String, ResolveError> {
        self.render_within(&mut Vec::new())
    }

    fn snapshot_into(
        &self,
        entries: &mut Vec<(String, Value)>,
        expanding: &mut Vec<String>,
    ) -> Result<(), ResolveError> {
        expanding.push(self.plan.name.clone());
        for (idx, accessor) in self.plan.accessors.iter().enumerate() {
            match &accessor.value_type {
                ValueType::Schema(_) => {
                    let nested = self.bind_nested(idx)?;
                    if !expanding.contains(&nested.plan.name) {
                        nested.snapshot_into(entries, expanding)?;
                    }
                }
                _ => entries.push((self.keys[idx].clone(), self.resolve_at(idx)?)),
            }
        }
        expanding.pop();
        Ok(())
    }

    fn render_within(&self, expanding: &mut Vec<String>) -> Result<String, ResolveError> {
        expanding.push(self.plan.name.clone());
        let mut parts = Vec::with_capacity(self.keys.len());
        for (idx, accessor) in self.plan.accessors.iter().enumerate() {
            let key = &self.keys[idx];
            let rendered = match &accessor.value_type {
                ValueType::Schema(_) => {
                    let nested = self.bind_nested(idx)?;
                    if expanding.contains(&nested.plan.name) {
                        format!("{}[...]", nested.plan.name)
                    } else {
                        nested.render_within(expanding)?
                    }
                }
                _ => self.resolve_at(idx)?.to_string(),
            };
            parts.push(format!("{key}={rendered}"));
        }
        expanding.pop();
        Ok(format!("{}[{}]", self.plan.name, parts.join(", ")))
    }

    fn lookup(&self, accessor: &str) -> Result<usize, ResolveError> {
        self.plan
            .position(accessor)
            .ok_or_else(|| ResolveError::UnknownAccessor {
                schema: self.plan.name.clone(),
                accessor: accessor.to_string(),
            })
    }

    fn resolve_at(&self, idx: usize) -> Result<Value, ResolveError> {
        let accessor = &self.plan.accessors[idx];
        let key = &self.keys[idx];
        if accessor.value_type.is_schema() {
            return Err(ResolveError::NotAValue { key: key.clone() });
        }

        let resolver = PropertyResolver::new(self.context.source.as_ref(), &self.context.decoders);
        let default = accessor.default.as_deref();
        if accessor.nullable {
            resolver
                .resolve_optional(key, &accessor.value_type, default)
                .map(|value| value.unwrap_or(Value::Null))
        } else {
            resolver.resolve(key, &accessor.value_type, default)
        }
    }

    /// Fresh instance of the nested schema at `idx`, under its full key.
    ///
    /// The nested plan is built at most once per accessor.
    fn bind_nested(&self, idx: usize) -> Result<BoundInstance, ResolveError> {
        let accessor = &self.plan.accessors[idx];
        let key = &self.keys[idx];
        let ValueType::Schema(nested) = &accessor.value_type else {
            return Err(ResolveError::NotASchema { key: key.clone() });
        };
        let plan = match accessor.nested.get() {
            Some(plan) => Arc::clone(plan),
            None => {
                let plan = Arc::new(SchemaPlan::build(&nested.schema(), self.context.naming)?);
                trace!("planned nested schema (schema={}, prefix={key})", plan.name);
                Arc::clone(accessor.nested.get_or_init(|| plan))
            }
        };
        Ok(BoundInstance::new(
            Arc::clone(&self.context),
            plan,
            Some(key.clone()),
        ))
    }
}

impl fmt::Debug for BoundInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundInstance")
            .field("schema", &self.plan.name)
            .field("prefix", &self.prefix)
            .field("keys", &self.keys)
            .finish()
    }
}
