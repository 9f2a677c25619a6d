//! Mapping between Rust types and declared value types.
//!
//! [`ConfigType`] ties a Rust type to the [`ValueType`] an accessor declares and
//! extracts it back out of a decoded [`Value`]. Primitives, `String`, `Option<T>`
//! and `Vec<T>` are covered here; enums use [`config_enum!`](crate::config_enum)
//! and custom types use [`config_type!`](crate::config_type).

use crate::value::{Value, ValueType};
use std::any::Any;
use std::sync::Arc;

/// A Rust type an accessor can return.
pub trait ConfigType: Sized + 'static {
    /// Nullable types resolve to `None` instead of failing when unset.
    const NULLABLE: bool = false;

    /// Declared type used for decoding.
    fn value_type() -> ValueType;

    /// Extract `Self` from a decoded value, handing the value back on mismatch.
    fn from_value(value: Value) -> Result<Self, Value>;
}

/// A Rust enum decodable by member name.
pub trait ConfigEnum: Sized + Copy + PartialEq + 'static {
    /// Name used in diagnostics.
    const TYPE_NAME: &'static str;
    /// Member names paired with their variants.
    const MEMBERS: &'static [(&'static str, Self)];

    /// Exact, case-sensitive lookup.
    fn from_member(name: &str) -> Option<Self> {
        Self::MEMBERS
            .iter()
            .find(|(member, _)| *member == name)
            .map(|(_, variant)| *variant)
    }

    /// Member name of this variant.
    fn member_name(self) -> &'static str {
        Self::MEMBERS
            .iter()
            .find(|(_, variant)| *variant == self)
            .map(|(member, _)| *member)
            .unwrap_or(Self::TYPE_NAME)
    }
}

macro_rules! primitive_config_type {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl ConfigType for $ty {
                fn value_type() -> ValueType {
                    ValueType::$variant
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )+
    };
}

primitive_config_type! {
    String => String,
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
}

impl<T: ConfigType> ConfigType for Option<T> {
    const NULLABLE: bool = true;

    fn value_type() -> ValueType {
        T::value_type()
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ConfigType> ConfigType for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::List(Box::new(T::value_type()))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(other),
        }
    }
}

/// Extract a [`ConfigEnum`] variant; used by [`config_enum!`](crate::config_enum).
pub fn enum_from_value<E: ConfigEnum>(value: Value) -> Result<E, Value> {
    match value {
        Value::Enum(member) => match E::from_member(&member) {
            Some(variant) => Ok(variant),
            None => Err(Value::Enum(member)),
        },
        other => Err(other),
    }
}

/// Extract a custom value; used by [`config_type!`](crate::config_type).
pub fn custom_from_value<T>(value: Value) -> Result<T, Value>
where
    T: Any + Send + Sync + Clone,
{
    match value {
        Value::Custom(custom) => custom
            .downcast::<T>()
            .map(Arc::unwrap_or_clone)
            .map_err(Value::Custom),
        other => Err(other),
    }
}

/// Implement [`ConfigEnum`] and [`ConfigType`] for a fieldless enum.
///
/// ```
/// use propbind_core::config_enum;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Mode {
///     Off,
///     Fast,
/// }
///
/// config_enum!(Mode { Off => "OFF", Fast => "FAST" });
/// ```
#[macro_export]
macro_rules! config_enum {
    ($ty:ident { $($variant:ident => $member:literal),+ $(,)? }) => {
        impl $crate::ConfigEnum for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);
            const MEMBERS: &'static [(&'static str, Self)] = &[$(($member, $ty::$variant)),+];
        }

        impl $crate::ConfigType for $ty {
            fn value_type() -> $crate::ValueType {
                $crate::ValueType::Enum($crate::EnumType::of::<$ty>())
            }

            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::Value> {
                $crate::enum_from_value::<$ty>(value)
            }
        }
    };
}

/// Implement [`ConfigType`] for a custom type.
///
/// `config_type!(T, from_str)` decodes through `T`'s [`FromStr`](std::str::FromStr)
/// implementation unless a converter is registered; `config_type!(T)` requires
/// a converter registered with the binder's decoder registry.
#[macro_export]
macro_rules! config_type {
    ($ty:ty, from_str) => {
        impl $crate::ConfigType for $ty {
            fn value_type() -> $crate::ValueType {
                $crate::ValueType::Custom($crate::CustomType::constructed::<$ty>())
            }

            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::Value> {
                $crate::custom_from_value::<$ty>(value)
            }
        }
    };
    ($ty:ty) => {
        impl $crate::ConfigType for $ty {
            fn value_type() -> $crate::ValueType {
                $crate::ValueType::Custom($crate::CustomType::opaque::<$ty>())
            }

            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::Value> {
                $crate::custom_from_value::<$ty>(value)
            }
        }
    };
}
