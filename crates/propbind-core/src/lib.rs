//! Schema-driven, live configuration binding.
//!
//! A [`Schema`] declares named accessors, each with a value type and an
//! optional default literal. A [`ConfigBinder`] validates the schema once and
//! produces a [`BoundInstance`] whose accessors read the layered source on
//! every call: the current value wins, then the decoded default, otherwise
//! [`ResolveError::MissingValue`].
//!
//! Typed facades are declared with [`config_schema!`]:
//!
//! ```
//! use std::sync::Arc;
//! use propbind_core::{ConfigBinder, config_schema};
//! use propbind_source::MapSource;
//!
//! config_schema! {
//!     pub struct ServerConfig at "server" {
//!         value get_host: String = "localhost";
//!         value get_port: u16 = "8080";
//!     }
//! }
//!
//! let source = MapSource::new().with_property("server.port", 9000);
//! let binder = ConfigBinder::new(Arc::new(source));
//! let server = binder.bind::<ServerConfig>().unwrap();
//! assert_eq!(server.get_host().unwrap(), "localhost");
//! assert_eq!(server.get_port().unwrap(), 9000);
//! ```

mod binder;
mod bound;
mod decoder;
mod error;
mod key;
mod property;
mod resolver;
mod schema;
mod typed;
mod value;

pub use binder::{ConfigBinder, ConfigBinderBuilder};
pub use bound::BoundInstance;
pub use decoder::DecoderRegistry;
pub use error::{DecodeError, ResolveError, SchemaError};
pub use key::{KeyNaming, derive_key};
pub use property::Property;
pub use resolver::PropertyResolver;
pub use schema::{Accessor, ConfigSchema, NestedSchema, Schema, SchemaBuilder};
pub use typed::{ConfigEnum, ConfigType, custom_from_value, enum_from_value};
pub use value::{CustomType, CustomValue, EnumType, Value, ValueType};

/// Declare a schema together with its typed facade.
///
/// ```text
/// config_schema! {
///     /// Doc comments and attributes go on the struct.
///     pub struct Name [at "prefix"] [: Parent, OtherParent] {
///         value accessor: Type [= "default"] [, key = "token"];
///         nested accessor: NestedFacade [, key = "token"];
///     }
/// }
/// ```
///
/// The struct derives `Clone` and `Debug`, implements [`ConfigSchema`] and
/// gets one method per declared accessor. `value` accessors return
/// `Result<Type, ResolveError>`; `nested` accessors bind the nested facade
/// under the accessor's key. Accessors inherited from parents and not
/// redeclared are reached through [`ConfigSchema::view`].
#[macro_export]
macro_rules! config_schema {
    (@decl value $accessor:ident $ty:ty, [$($default:literal)?] [$($key:literal)?]) => {
        $crate::Accessor::of::<$ty>(stringify!($accessor))
            $(.with_default($default))?
            $(.with_key($key))?
    };
    (@decl nested $accessor:ident $ty:ty, [] [$($key:literal)?]) => {
        $crate::Accessor::nested::<$ty>(stringify!($accessor))
            $(.with_key($key))?
    };

    (@method [$(#[$fmeta:meta])*] value $accessor:ident $ty:ty) => {
        $(#[$fmeta])*
        pub fn $accessor(&self) -> ::std::result::Result<$ty, $crate::ResolveError> {
            $crate::ConfigSchema::bound(self).get_as::<$ty>(stringify!($accessor))
        }
    };
    (@method [$(#[$fmeta:meta])*] nested $accessor:ident $ty:ty) => {
        $(#[$fmeta])*
        pub fn $accessor(&self) -> ::std::result::Result<$ty, $crate::ResolveError> {
            $crate::ConfigSchema::bound(self).nested_as::<$ty>(stringify!($accessor))
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(at $prefix:literal)? $(: $($parent:path),+)? {
            $(
                $(#[$fmeta:meta])*
                $kind:ident $accessor:ident : $ty:ty $(= $default:literal)? $(, key = $key:literal)?;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        $vis struct $name {
            bound: $crate::BoundInstance,
        }

        impl $crate::ConfigSchema for $name {
            fn schema() -> $crate::Schema {
                $crate::Schema::builder(stringify!($name))
                    $(.prefix($prefix))?
                    $($(.extends(<$parent as $crate::ConfigSchema>::schema()))+)?
                    $(.accessor($crate::config_schema!(
                        @decl $kind $accessor $ty, [$($default)?] [$($key)?]
                    )))*
                    .build()
            }

            fn from_bound(bound: $crate::BoundInstance) -> Self {
                Self { bound }
            }

            fn bound(&self) -> &$crate::BoundInstance {
                &self.bound
            }
        }

        impl $name {
            $(
                $crate::config_schema!(@method [$(#[$fmeta])*] $kind $accessor $ty);
            )*
        }
    };
}
