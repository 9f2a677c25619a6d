//! Error types for decoding, resolution and schema binding.

use thiserror::Error;

/// A raw value or default literal could not be converted to its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Text did not parse as the target primitive.
    #[error("cannot decode {raw:?} as {target}: {reason}")]
    InvalidValue {
        raw: String,
        target: String,
        reason: String,
    },
    /// Enum lookup by member name failed.
    #[error("cannot decode {raw:?} as {target}: no such enum member")]
    NoSuchEnumMember { raw: String, target: String },
    /// A registered converter or string constructor rejected the text.
    #[error("cannot decode {raw:?} as {target}: construction failed: {reason}")]
    ConstructionFailed {
        raw: String,
        target: String,
        reason: String,
    },
    /// No decoding rule exists for the target type.
    #[error("cannot decode as {target}: unsupported type")]
    UnsupportedType { target: String },
}

/// Errors detected while binding a schema, before any value is read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The same accessor name is declared twice in one schema.
    #[error("schema {schema} declares accessor {accessor} more than once")]
    DuplicateAccessor { schema: String, accessor: String },
    /// Two parents declare the same accessor differently and the schema does not settle it.
    #[error("schema {schema} inherits conflicting declarations of {accessor}")]
    AmbiguousAccessor { schema: String, accessor: String },
    /// Two distinct accessors derive the same key.
    #[error("schema {schema} derives key {key} for both {first} and {second}")]
    DuplicateKey {
        schema: String,
        key: String,
        first: String,
        second: String,
    },
    /// A default literal can never decode to the declared type.
    #[error("accessor {schema}.{accessor} has an invalid default: {source}")]
    InvalidDefault {
        schema: String,
        accessor: String,
        #[source]
        source: DecodeError,
    },
    /// The declared type has no decoding rule in the binder's registry.
    #[error("accessor {schema}.{accessor} has unsupported type {type_name}")]
    UnsupportedType {
        schema: String,
        accessor: String,
        type_name: String,
    },
    /// Nested schema accessors have no single value to default.
    #[error("nested accessor {schema}.{accessor} cannot declare a default")]
    DefaultOnNested { schema: String, accessor: String },
}

/// Errors returned when invoking an accessor on a bound instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No layer defines the key and the accessor has no default.
    #[error("no value for {key} and no default declared")]
    MissingValue { key: String },
    /// The current value (or the default) failed to decode.
    #[error("failed to decode {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: DecodeError,
    },
    /// The schema has no accessor with this name.
    #[error("schema {schema} has no accessor {accessor}")]
    UnknownAccessor { schema: String, accessor: String },
    /// A nested schema accessor was read as a value.
    #[error("accessor for {key} returns a nested schema, not a value")]
    NotAValue { key: String },
    /// A value accessor was read as a nested schema.
    #[error("accessor for {key} does not return a nested schema")]
    NotASchema { key: String },
    /// The decoded value does not match the requested Rust type.
    #[error("accessor for {key} yields {found}, not {expected}")]
    TypeMismatch {
        key: String,
        expected: String,
        found: String,
    },
    /// Binding a nested schema failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ResolveError {
    /// The configuration key the failure concerns, when there is one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::MissingValue { key }
            | Self::Decode { key, .. }
            | Self::NotAValue { key }
            | Self::NotASchema { key }
            | Self::TypeMismatch { key, .. } => Some(key),
            Self::UnknownAccessor { .. } | Self::Schema(_) => None,
        }
    }
}
