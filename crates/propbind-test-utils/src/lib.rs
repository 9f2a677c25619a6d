//! Test helpers shared across propbind crates.

pub mod files;
pub mod sources;

pub use files::{ConfigTree, write_layer};
pub use sources::{CountingSource, settable_from};
