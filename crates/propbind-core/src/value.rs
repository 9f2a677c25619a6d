//! Declared value types and decoded values.

use crate::schema::NestedSchema;
use crate::typed::ConfigEnum;
use std::any::{Any, TypeId};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Constructor turning raw text into a custom value.
pub(crate) type Constructor = Arc<dyn Fn(&str) -> Result<CustomValue, String> + Send + Sync>;

/// Semantic type an accessor is declared to return.
#[derive(Clone, Debug)]
pub enum ValueType {
    String,
    Bool,
    I32,
    I64,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    /// Enum decoded by exact member name.
    Enum(EnumType),
    /// Comma-delimited list of the element type.
    List(Box<ValueType>),
    /// Arbitrary type decoded by a registered converter or a string constructor.
    Custom(CustomType),
    /// Nested schema scoped under the accessor's key.
    Schema(NestedSchema),
}

impl ValueType {
    /// Human-readable type name used in diagnostics.
    pub fn name(&self) -> String {
        match self {
            Self::String => "String".to_string(),
            Self::Bool => "bool".to_string(),
            Self::I32 => "i32".to_string(),
            Self::I64 => "i64".to_string(),
            Self::U16 => "u16".to_string(),
            Self::U32 => "u32".to_string(),
            Self::U64 => "u64".to_string(),
            Self::Usize => "usize".to_string(),
            Self::F32 => "f32".to_string(),
            Self::F64 => "f64".to_string(),
            Self::Enum(enum_type) => enum_type.name().to_string(),
            Self::List(element) => format!("Vec<{}>", element.name()),
            Self::Custom(custom) => custom.name().to_string(),
            Self::Schema(nested) => nested.schema().name().to_string(),
        }
    }

    /// Whether two declarations describe the same type.
    pub fn same_as(&self, other: &ValueType) -> bool {
        match (self, other) {
            (Self::Enum(a), Self::Enum(b)) => a.name() == b.name(),
            (Self::List(a), Self::List(b)) => a.same_as(b),
            (Self::Custom(a), Self::Custom(b)) => a.type_id() == b.type_id(),
            (Self::Schema(a), Self::Schema(b)) => a.schema().name() == b.schema().name(),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }

    /// Whether this is a nested schema rather than a decodable value.
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }
}

/// Enum type described by its name and member names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    members: Vec<String>,
}

impl EnumType {
    /// Describe an enum by name and members.
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Describe a Rust enum implementing [`ConfigEnum`].
    pub fn of<E: ConfigEnum>() -> Self {
        Self::new(E::TYPE_NAME, E::MEMBERS.iter().map(|(member, _)| *member))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Exact, case-sensitive member lookup.
    pub fn member(&self, raw: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|member| member.as_str() == raw)
            .map(String::as_str)
    }
}

/// A type outside the built-in rules, identified by its Rust type.
#[derive(Clone)]
pub struct CustomType {
    type_id: TypeId,
    name: &'static str,
    constructor: Option<Constructor>,
}

impl CustomType {
    /// A type constructible from one string through [`FromStr`].
    pub fn constructed<T>() -> Self
    where
        T: FromStr + Any + Send + Sync + fmt::Display,
        T::Err: fmt::Display,
    {
        Self {
            type_id: TypeId::of::<T>(),
            name: short_type_name::<T>(),
            constructor: Some(Arc::new(|raw: &str| {
                raw.parse::<T>()
                    .map(CustomValue::new)
                    .map_err(|err| err.to_string())
            })),
        }
    }

    /// A type with no constructor; only a registered converter can decode it.
    pub fn opaque<T: Any + Send + Sync + fmt::Display>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: short_type_name::<T>(),
            constructor: None,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    pub(crate) fn constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomType")
            .field("name", &self.name)
            .field("constructor", &self.constructor.is_some())
            .finish()
    }
}

/// Decoded instance of a custom type.
#[derive(Clone)]
pub struct CustomValue {
    type_id: TypeId,
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
    repr: String,
}

impl CustomValue {
    pub fn new<T: Any + Send + Sync + fmt::Display>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: short_type_name::<T>(),
            repr: value.to_string(),
            value: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Recover the shared value, or give `self` back on a type mismatch.
    pub fn downcast<T: Any + Send + Sync>(self) -> Result<Arc<T>, Self> {
        if !self.is::<T>() {
            return Err(self);
        }
        let Self {
            type_id,
            type_name,
            value,
            repr,
        } = self;
        value.downcast::<T>().map_err(|value| Self {
            type_id,
            type_name,
            value,
            repr,
        })
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.repr == other.repr
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name, self.repr)
    }
}

impl fmt::Display for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

/// A decoded configuration value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent value of a nullable accessor.
    Null,
    String(String),
    Bool(bool),
    I32(i32),
    I64(i64),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    /// Enum member name.
    Enum(String),
    List(Vec<Value>),
    Custom(CustomValue),
}

impl Value {
    /// Short name of the value's kind, used in mismatch errors.
    pub fn kind(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::String(_) => "String".to_string(),
            Self::Bool(_) => "bool".to_string(),
            Self::I32(_) => "i32".to_string(),
            Self::I64(_) => "i64".to_string(),
            Self::U16(_) => "u16".to_string(),
            Self::U32(_) => "u32".to_string(),
            Self::U64(_) => "u64".to_string(),
            Self::Usize(_) => "usize".to_string(),
            Self::F32(_) => "f32".to_string(),
            Self::F64(_) => "f64".to_string(),
            Self::Enum(member) => format!("enum member {member}"),
            Self::List(_) => "list".to_string(),
            Self::Custom(custom) => custom.type_name().to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow string and enum member text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) | Self::Enum(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::String(text) | Self::Enum(text) => f.write_str(text),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::I32(number) => write!(f, "{number}"),
            Self::I64(number) => write!(f, "{number}"),
            Self::U16(number) => write!(f, "{number}"),
            Self::U32(number) => write!(f, "{number}"),
            Self::U64(number) => write!(f, "{number}"),
            Self::Usize(number) => write!(f, "{number}"),
            Self::F32(number) => write!(f, "{number}"),
            Self::F64(number) => write!(f, "{number}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Custom(custom) => write!(f, "{custom}"),
        }
    }
}

/// Last path segment of a type name, keeping generic names whole.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    if full.contains('<') {
        return full;
    }
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Port(u16);

    impl fmt::Display for Port {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, ":{}", self.0)
        }
    }

    #[test]
    fn custom_values_downcast_by_type() {
        let value = CustomValue::new(Port(80));
        assert_eq!(value.type_name(), "Port");
        assert_eq!(value.downcast_ref::<Port>(), Some(&Port(80)));
        assert!(value.downcast_ref::<String>().is_none());

        let value = value.downcast::<String>().unwrap_err();
        let port = value.downcast::<Port>().expect("port");
        assert_eq!(*port, Port(80));
    }

    #[test]
    fn value_types_compare_by_shape() {
        let colors = EnumType::new("Color", ["RED", "GREEN"]);
        assert!(ValueType::Enum(colors.clone()).same_as(&ValueType::Enum(colors)));
        assert!(!ValueType::I32.same_as(&ValueType::I64));
        assert!(
            ValueType::List(Box::new(ValueType::String))
                .same_as(&ValueType::List(Box::new(ValueType::String)))
        );
        assert!(
            !ValueType::Custom(CustomType::opaque::<Port>())
                .same_as(&ValueType::Custom(CustomType::opaque::<String>()))
        );
        assert_eq!(
            ValueType::List(Box::new(ValueType::U16)).name(),
            "Vec<u16>".to_string()
        );
    }

    #[test]
    fn values_render_for_diagnostics() {
        let list = Value::List(vec![Value::I32(1), Value::I32(2)]);
        assert_eq!(list.to_string(), "[1, 2]");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Custom(CustomValue::new(Port(8))).to_string(), ":8");
        assert_eq!(Value::Enum("A".to_string()).as_str(), Some("A"));
    }
}
