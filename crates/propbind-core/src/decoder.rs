//! Conversion of raw text into declared value types.

use crate::error::DecodeError;
use crate::value::{CustomType, CustomValue, Value, ValueType};
use log::debug;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

type Converter = Arc<dyn Fn(&str) -> Result<CustomValue, String> + Send + Sync>;

/// Decoding rules injected into a binder.
///
/// Rules are tried in a fixed order: the built-in rule for primitives, strings,
/// booleans, enums and lists; then a converter registered for the exact custom
/// type; then the type's single-string constructor.
#[derive(Clone, Default)]
pub struct DecoderRegistry {
    converters: HashMap<TypeId, (&'static str, Converter)>,
}

impl DecoderRegistry {
    /// Create a registry with only the built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter for a custom type, replacing any previous one.
    pub fn register<T, E, F>(&mut self, convert: F)
    where
        T: Any + Send + Sync + fmt::Display,
        E: fmt::Display,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        let name = std::any::type_name::<T>();
        debug!("registering decoder (type={name})");
        let converter: Converter = Arc::new(move |raw: &str| {
            convert(raw)
                .map(CustomValue::new)
                .map_err(|err| err.to_string())
        });
        self.converters.insert(TypeId::of::<T>(), (name, converter));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_converter<T, E, F>(mut self, convert: F) -> Self
    where
        T: Any + Send + Sync + fmt::Display,
        E: fmt::Display,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        self.register(convert);
        self
    }

    /// Whether a converter is registered for `T`.
    pub fn is_registered<T: Any>(&self) -> bool {
        self.converters.contains_key(&TypeId::of::<T>())
    }

    /// Names of the types with registered converters.
    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut names = self
            .converters
            .values()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Whether some rule can decode the type.
    pub fn supports(&self, target: &ValueType) -> bool {
        match target {
            ValueType::Custom(custom) => {
                self.converters.contains_key(&custom.type_id()) || custom.has_constructor()
            }
            ValueType::List(element) => self.supports(element),
            ValueType::Schema(_) => false,
            _ => true,
        }
    }

    /// Decode raw text into the target type.
    pub fn decode(&self, raw: &str, target: &ValueType) -> Result<Value, DecodeError> {
        match target {
            ValueType::String => Ok(Value::String(raw.to_string())),
            ValueType::Bool => decode_bool(raw),
            ValueType::I32 => parse_number(raw, target).map(Value::I32),
            ValueType::I64 => parse_number(raw, target).map(Value::I64),
            ValueType::U16 => parse_number(raw, target).map(Value::U16),
            ValueType::U32 => parse_number(raw, target).map(Value::U32),
            ValueType::U64 => parse_number(raw, target).map(Value::U64),
            ValueType::Usize => parse_number(raw, target).map(Value::Usize),
            ValueType::F32 => parse_number(raw, target).map(Value::F32),
            ValueType::F64 => parse_number(raw, target).map(Value::F64),
            ValueType::Enum(enum_type) => enum_type
                .member(raw)
                .map(|member| Value::Enum(member.to_string()))
                .ok_or_else(|| DecodeError::NoSuchEnumMember {
                    raw: raw.to_string(),
                    target: enum_type.name().to_string(),
                }),
            ValueType::List(element) => raw
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| self.decode(item, element))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            ValueType::Custom(custom) => self.decode_custom(raw, custom),
            ValueType::Schema(_) => Err(DecodeError::UnsupportedType {
                target: target.name(),
            }),
        }
    }

    fn decode_custom(&self, raw: &str, custom: &CustomType) -> Result<Value, DecodeError> {
        let construct = match self.converters.get(&custom.type_id()) {
            Some((_, converter)) => converter,
            None => match custom.constructor() {
                Some(constructor) => constructor,
                None => {
                    return Err(DecodeError::UnsupportedType {
                        target: custom.name().to_string(),
                    });
                }
            },
        };
        construct(raw)
            .map(Value::Custom)
            .map_err(|reason| DecodeError::ConstructionFailed {
                raw: raw.to_string(),
                target: custom.name().to_string(),
                reason,
            })
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("converters", &self.registered_types())
            .finish()
    }
}

fn decode_bool(raw: &str) -> Result<Value, DecodeError> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(Value::Bool(true))
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(Value::Bool(false))
    } else {
        Err(DecodeError::InvalidValue {
            raw: raw.to_string(),
            target: "bool".to_string(),
            reason: "expected true or false".to_string(),
        })
    }
}

fn parse_number<T>(raw: &str, target: &ValueType) -> Result<T, DecodeError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>().map_err(|err| DecodeError::InvalidValue {
        raw: raw.to_string(),
        target: target.name(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::EnumType;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Ratio(u32, u32);

    impl fmt::Display for Ratio {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}/{}", self.0, self.1)
        }
    }

    impl FromStr for Ratio {
        type Err = String;

        fn from_str(raw: &str) -> Result<Self, Self::Err> {
            let (num, den) = raw.split_once('/').ok_or("expected num/den")?;
            Ok(Self(
                num.parse().map_err(|_| "bad numerator")?,
                den.parse().map_err(|_| "bad denominator")?,
            ))
        }
    }

    #[test]
    fn decodes_primitives() {
        let registry = DecoderRegistry::new();
        assert_eq!(
            registry.decode("abc", &ValueType::String),
            Ok(Value::String("abc".to_string()))
        );
        assert_eq!(registry.decode("-12", &ValueType::I32), Ok(Value::I32(-12)));
        assert_eq!(registry.decode("65535", &ValueType::U16), Ok(Value::U16(65535)));
        assert_eq!(registry.decode("1.5", &ValueType::F64), Ok(Value::F64(1.5)));
        assert_eq!(registry.decode("TRUE", &ValueType::Bool), Ok(Value::Bool(true)));
        assert_eq!(registry.decode("False", &ValueType::Bool), Ok(Value::Bool(false)));
    }

    #[test]
    fn rejects_malformed_numbers_and_booleans() {
        let registry = DecoderRegistry::new();
        assert!(matches!(
            registry.decode("12x", &ValueType::I64),
            Err(DecodeError::InvalidValue { .. })
        ));
        assert!(matches!(
            registry.decode(" 1", &ValueType::I32),
            Err(DecodeError::InvalidValue { .. })
        ));
        assert!(matches!(
            registry.decode("70000", &ValueType::U16),
            Err(DecodeError::InvalidValue { .. })
        ));
        assert!(matches!(
            registry.decode("yes", &ValueType::Bool),
            Err(DecodeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn enum_lookup_is_case_sensitive() {
        let registry = DecoderRegistry::new();
        let target = ValueType::Enum(EnumType::new("Mode", ["NONE", "A"]));
        assert_eq!(
            registry.decode("A", &target),
            Ok(Value::Enum("A".to_string()))
        );
        let err = registry.decode("a", &target).unwrap_err();
        assert_eq!(
            err,
            DecodeError::NoSuchEnumMember {
                raw: "a".to_string(),
                target: "Mode".to_string(),
            }
        );
        assert!(err.to_string().contains("no such enum member"));
    }

    #[test]
    fn lists_split_on_commas() {
        let registry = DecoderRegistry::new();
        let target = ValueType::List(Box::new(ValueType::U32));
        assert_eq!(
            registry.decode("1, 2,,3", &target),
            Ok(Value::List(vec![Value::U32(1), Value::U32(2), Value::U32(3)]))
        );
        assert_eq!(registry.decode("", &target), Ok(Value::List(Vec::new())));
        assert!(registry.decode("1,x", &target).is_err());
    }

    #[test]
    fn constructed_types_wrap_failures() {
        let registry = DecoderRegistry::new();
        let target = ValueType::Custom(CustomType::constructed::<Ratio>());
        let value = registry.decode("3/4", &target).expect("ratio");
        match value {
            Value::Custom(custom) => assert_eq!(custom.downcast_ref::<Ratio>(), Some(&Ratio(3, 4))),
            other => panic!("unexpected value {other:?}"),
        }

        let err = registry.decode("3", &target).unwrap_err();
        assert_eq!(
            err,
            DecodeError::ConstructionFailed {
                raw: "3".to_string(),
                target: "Ratio".to_string(),
                reason: "expected num/den".to_string(),
            }
        );
    }

    #[test]
    fn registered_converters_win_over_constructors() {
        let registry = DecoderRegistry::new()
            .with_converter(|raw: &str| -> Result<Ratio, String> { Ok(Ratio(raw.len() as u32, 1)) });
        assert!(registry.is_registered::<Ratio>());

        let target = ValueType::Custom(CustomType::constructed::<Ratio>());
        let value = registry.decode("abc", &target).expect("ratio");
        assert_eq!(value.to_string(), "3/1");
    }

    #[test]
    fn unsupported_types_need_a_converter() {
        let target = ValueType::Custom(CustomType::opaque::<Ratio>());
        let registry = DecoderRegistry::new();
        assert!(!registry.supports(&target));
        assert!(!registry.supports(&ValueType::List(Box::new(target.clone()))));
        let err = registry.decode("1/2", &target).unwrap_err();
        assert!(err.to_string().contains("unsupported type"));

        let registry = registry.with_converter(|raw: &str| raw.parse::<Ratio>());
        assert!(registry.supports(&target));
        assert_eq!(
            registry.decode("1/2", &target).map(|value| value.to_string()),
            Ok("1/2".to_string())
        );
    }
}
