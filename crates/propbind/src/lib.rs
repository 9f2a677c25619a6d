//! Public SDK surface for propbind.
//!
//! This crate re-exports the binding engine and the source implementations,
//! and provides [`LiveConfig`], which stacks a runtime override layer on top
//! of the layered configuration files.

/// Re-export for convenience.
pub use propbind_core as core;
/// Re-export for convenience.
pub use propbind_source as source;

pub use propbind_core::{
    Accessor, BoundInstance, ConfigBinder, ConfigEnum, ConfigSchema, ConfigType, DecodeError,
    DecoderRegistry, KeyNaming, Property, ResolveError, Schema, SchemaError, Value, ValueType,
    config_enum, config_schema, config_type,
};
pub use propbind_source::{
    CompositeSource, ConfigLayer, ConfigSource, LayeredSourceOptions, SettableSource, SourceError,
};

mod live;

pub use live::{LiveConfig, OVERRIDES_LAYER};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
