//! Schema declarations: named, typed accessors with defaults and inheritance.

use crate::bound::BoundInstance;
use crate::error::SchemaError;
use crate::typed::ConfigType;
use crate::value::ValueType;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// A Rust type acting as the typed facade of a schema.
///
/// Implementors wrap the [`BoundInstance`] handed to [`from_bound`](Self::from_bound)
/// and expose one method per accessor. [`config_schema!`](crate::config_schema)
/// generates all of this.
pub trait ConfigSchema: Sized + 'static {
    /// The schema declaration.
    fn schema() -> Schema;

    /// Wrap a bound instance of [`schema`](Self::schema).
    fn from_bound(bound: BoundInstance) -> Self;

    /// The wrapped bound instance.
    fn bound(&self) -> &BoundInstance;

    /// View this instance through an ancestor schema's facade.
    ///
    /// Accessors keep the keys and defaults of the most derived schema.
    fn view<P: ConfigSchema>(&self) -> P {
        P::from_bound(self.bound().clone())
    }
}

/// Schema returned by a nested accessor.
#[derive(Clone)]
pub struct NestedSchema(NestedInner);

#[derive(Clone)]
enum NestedInner {
    Declared(Schema),
    Deferred(fn() -> Schema),
}

impl NestedSchema {
    /// Nested schema of a typed facade, loaded on demand.
    pub fn of<S: ConfigSchema>() -> Self {
        Self::from_deferred(S::schema)
    }

    /// Nested schema produced by `load` whenever it is needed; lets a schema
    /// refer to itself.
    pub fn from_deferred(load: fn() -> Schema) -> Self {
        Self(NestedInner::Deferred(load))
    }

    /// Nested schema given by value.
    pub fn from_schema(schema: Schema) -> Self {
        Self(NestedInner::Declared(schema))
    }

    /// The nested schema declaration.
    pub fn schema(&self) -> Schema {
        match &self.0 {
            NestedInner::Declared(schema) => schema.clone(),
            NestedInner::Deferred(load) => load(),
        }
    }

    /// Stable identity of the declaration, without loading it.
    pub(crate) fn identity(&self) -> usize {
        match &self.0 {
            NestedInner::Declared(schema) => schema.identity(),
            NestedInner::Deferred(load) => *load as usize,
        }
    }
}

impl fmt::Debug for NestedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NestedSchema")
            .field(&self.schema().name())
            .finish()
    }
}

/// One accessor of a schema.
#[derive(Clone, Debug)]
pub struct Accessor {
    name: String,
    key: Option<String>,
    value_type: ValueType,
    default: Option<String>,
    nullable: bool,
}

impl Accessor {
    /// Accessor with an explicit declared type.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            key: None,
            value_type,
            default: None,
            nullable: false,
        }
    }

    /// Accessor returning the Rust type `T`.
    pub fn of<T: ConfigType>(name: impl Into<String>) -> Self {
        let mut accessor = Self::new(name, T::value_type());
        accessor.nullable = T::NULLABLE;
        accessor
    }

    /// Accessor returning the typed facade `S`.
    pub fn nested<S: ConfigSchema>(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Schema(NestedSchema::of::<S>()))
    }

    /// Accessor returning a nested schema given by value.
    pub fn nested_schema(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, ValueType::Schema(NestedSchema::from_schema(schema)))
    }

    /// Attach a default literal, decoded only when the key is unset.
    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Replace the derived field token with an explicit one.
    pub fn with_key(mut self, token: impl Into<String>) -> Self {
        self.key = Some(token.into());
        self
    }

    /// Resolve to null instead of failing when unset.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit field token, if one was declared.
    pub fn key_override(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn default_literal(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_nested(&self) -> bool {
        self.value_type.is_schema()
    }

    fn same_declaration(&self, other: &Accessor) -> bool {
        self.value_type.same_as(&other.value_type)
            && self.default == other.default
            && self.key == other.key
            && self.nullable == other.nullable
    }
}

/// Immutable schema declaration; cheap to clone.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

struct SchemaInner {
    name: String,
    prefix: Option<String>,
    parents: Vec<Schema>,
    accessors: Vec<Accessor>,
}

impl Schema {
    /// Start declaring a schema.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            prefix: None,
            parents: Vec::new(),
            accessors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Prefix used when bound without an explicit one.
    pub fn prefix(&self) -> Option<&str> {
        self.inner.prefix.as_deref()
    }

    pub fn parents(&self) -> &[Schema] {
        &self.inner.parents
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    /// Accessors declared directly on this schema.
    pub fn declared_accessors(&self) -> &[Accessor] {
        &self.inner.accessors
    }

    /// Effective accessors: ancestors' accessors overridden by name with this
    /// schema's own, ancestors first.
    ///
    /// An override's declared type replaces the inherited one. It keeps the
    /// inherited key, and the inherited default when the type is unchanged,
    /// unless it declares its own. Parents that declare the same accessor differently must be settled
    /// by an override carrying a default.
    pub fn accessors(&self) -> Result<Vec<Accessor>, SchemaError> {
        let mut merged: Vec<Accessor> = Vec::new();
        let mut ambiguous = BTreeSet::new();

        for parent in &self.inner.parents {
            for accessor in parent.accessors()? {
                match merged.iter().find(|known| known.name == accessor.name) {
                    None => merged.push(accessor),
                    Some(known) if known.same_declaration(&accessor) => {}
                    Some(_) => {
                        ambiguous.insert(accessor.name);
                    }
                }
            }
        }

        let mut own_names = HashSet::new();
        for own in &self.inner.accessors {
            if !own_names.insert(own.name.as_str()) {
                return Err(SchemaError::DuplicateAccessor {
                    schema: self.name().to_string(),
                    accessor: own.name.clone(),
                });
            }
            let Some(idx) = merged.iter().position(|known| known.name == own.name) else {
                merged.push(own.clone());
                continue;
            };

            let was_ambiguous = ambiguous.remove(&own.name);
            if was_ambiguous && own.default.is_none() {
                return Err(SchemaError::AmbiguousAccessor {
                    schema: self.name().to_string(),
                    accessor: own.name.clone(),
                });
            }

            let inherited = &merged[idx];
            let mut resolved = own.clone();
            // An inherited default only carries over while the type is unchanged.
            if resolved.default.is_none() && inherited.value_type.same_as(&own.value_type) {
                resolved.default = inherited.default.clone();
            }
            if resolved.key.is_none() {
                resolved.key = inherited.key.clone();
            }
            merged[idx] = resolved;
        }

        if let Some(accessor) = ambiguous.into_iter().next() {
            return Err(SchemaError::AmbiguousAccessor {
                schema: self.name().to_string(),
                accessor,
            });
        }
        Ok(merged)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.inner.name)
            .field("prefix", &self.inner.prefix)
            .field(
                "parents",
                &self
                    .inner
                    .parents
                    .iter()
                    .map(Schema::name)
                    .collect::<Vec<_>>(),
            )
            .field("accessors", &self.inner.accessors)
            .finish()
    }
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    prefix: Option<String>,
    parents: Vec<Schema>,
    accessors: Vec<Accessor>,
}

impl SchemaBuilder {
    /// Prefix applied when the schema is bound at top level without one.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Inherit every accessor of `parent`.
    pub fn extends(mut self, parent: Schema) -> Self {
        self.parents.push(parent);
        self
    }

    pub fn accessor(mut self, accessor: Accessor) -> Self {
        self.accessors.push(accessor);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            inner: Arc::new(SchemaInner {
                name: self.name,
                prefix: self.prefix,
                parents: self.parents,
                accessors: self.accessors,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Schema {
        Schema::builder("Base")
            .accessor(Accessor::of::<String>("get_str").with_default("basedefault"))
            .accessor(Accessor::of::<Option<bool>>("get_base_boolean"))
            .build()
    }

    fn names(accessors: &[Accessor]) -> Vec<&str> {
        accessors.iter().map(Accessor::name).collect()
    }

    #[test]
    fn override_replaces_inherited_default() {
        let root = Schema::builder("Root")
            .extends(base())
            .accessor(Accessor::of::<String>("get_str").with_default("default"))
            .accessor(Accessor::of::<i32>("get_integer").with_default("0"))
            .build();

        let accessors = root.accessors().expect("accessors");
        assert_eq!(
            names(&accessors),
            vec!["get_str", "get_base_boolean", "get_integer"]
        );
        assert_eq!(accessors[0].default_literal(), Some("default"));
        assert!(accessors[1].is_nullable());
    }

    #[test]
    fn override_without_default_keeps_inherited_one() {
        let root = Schema::builder("Root")
            .extends(base())
            .accessor(Accessor::of::<String>("get_str").with_key("text"))
            .build();
        let accessors = root.accessors().expect("accessors");
        assert_eq!(accessors[0].default_literal(), Some("basedefault"));
        assert_eq!(accessors[0].key_override(), Some("text"));
    }

    #[test]
    fn override_replaces_inherited_type() {
        let root = Schema::builder("Root")
            .extends(base())
            .accessor(Accessor::of::<i64>("get_str"))
            .accessor(Accessor::of::<bool>("get_base_boolean").with_default("true"))
            .build();
        let accessors = root.accessors().expect("accessors");
        assert_eq!(accessors[0].value_type().name(), "i64");
        assert_eq!(accessors[0].default_literal(), None);
        assert_eq!(accessors[1].value_type().name(), "bool");
        assert!(!accessors[1].is_nullable());

        assert_eq!(names(root.declared_accessors()), vec!["get_str", "get_base_boolean"]);
        assert_eq!(root.parents()[0].name(), "Base");
    }

    #[test]
    fn nullable_accessors_can_be_declared_explicitly() {
        let accessor = Accessor::new("get_port", ValueType::U16).nullable();
        assert!(accessor.is_nullable());
        assert!(!Accessor::new("get_port", ValueType::U16).is_nullable());
    }

    #[test]
    fn diverging_parents_are_ambiguous_until_settled() {
        let other = Schema::builder("Other")
            .accessor(Accessor::of::<String>("get_str").with_default("other"))
            .build();

        let unsettled = Schema::builder("Root")
            .extends(base())
            .extends(other.clone())
            .build();
        assert!(matches!(
            unsettled.accessors(),
            Err(SchemaError::AmbiguousAccessor { .. })
        ));

        let settled = Schema::builder("Root")
            .extends(base())
            .extends(other)
            .accessor(Accessor::of::<String>("get_str").with_default("mine"))
            .build();
        let accessors = settled.accessors().expect("accessors");
        assert_eq!(accessors[0].default_literal(), Some("mine"));
    }

    #[test]
    fn diamond_inheritance_is_not_ambiguous() {
        let left = Schema::builder("Left").extends(base()).build();
        let right = Schema::builder("Right").extends(base()).build();
        let root = Schema::builder("Root").extends(left).extends(right).build();
        assert_eq!(
            names(&root.accessors().expect("accessors")),
            vec!["get_str", "get_base_boolean"]
        );
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let schema = Schema::builder("Dup")
            .accessor(Accessor::of::<String>("name"))
            .accessor(Accessor::of::<String>("name"))
            .build();
        assert!(matches!(
            schema.accessors(),
            Err(SchemaError::DuplicateAccessor { .. })
        ));
    }
}
