//! Configuration sources consumed by bound configuration facades.
//!
//! This crate owns the key/value lookup contract and its implementations:
//! in-memory maps, a shared settable store for runtime overrides, layered
//! composites and JSON5 documents discovered on disk.

mod composite;
mod document;
mod error;
mod loader;
mod settable;
mod source;

/// Layered source stacking named sources by precedence.
pub use composite::CompositeSource;
/// JSON5 document flattened into dotted keys.
pub use document::Json5Source;
/// Public error type returned by source loading.
pub use error::SourceError;
/// Layered file discovery.
pub use loader::{
    ConfigLayer, ConfigLayerSource, LayeredSource, LayeredSourceOptions,
    load_layered_source_with_options,
};
/// Settable source for runtime overrides.
pub use settable::SettableSource;
/// Source contract and simple in-memory sources.
pub use source::{ConfigSource, EmptySource, MapSource};
