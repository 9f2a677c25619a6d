//! JSON5 documents exposed as flat dotted properties.

use crate::{ConfigSource, MapSource, SourceError};
use log::debug;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Immutable source parsed from a JSON5 document.
///
/// Nested objects become dotted keys (`{ http: { port: 80 } }` yields
/// `http.port = "80"`), arrays of scalars become comma-joined values and
/// `null` entries are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json5Source {
    inner: MapSource,
}

impl Json5Source {
    /// Parse JSON5 contents.
    pub fn parse(contents: &str) -> Result<Self, SourceError> {
        debug!("parsing json5 source (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        Self::from_value(&value, "document")
    }

    /// Read and parse a JSON5 file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        debug!("loading json5 source (path={})", path.display());
        let contents = fs::read_to_string(path)?;
        let value: Value = json5::from_str(&contents)?;
        Self::from_value(&value, &path.display().to_string())
    }

    /// Flatten an already parsed document. `label` names the document in errors.
    pub fn from_value(value: &Value, label: &str) -> Result<Self, SourceError> {
        let map = expect_object(value, label, "")?;
        let mut values = BTreeMap::new();
        flatten_object(map, label, "", &mut values)?;
        Ok(Self {
            inner: MapSource::from_map(values),
        })
    }

    /// Number of flattened properties.
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl ConfigSource for Json5Source {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

fn flatten_object(
    map: &Map<String, Value>,
    label: &str,
    path: &str,
    out: &mut BTreeMap<String, String>,
) -> Result<(), SourceError> {
    for (key, value) in map {
        let key_path = join_path(path, key);
        match value {
            Value::Null => {}
            Value::Object(nested) => flatten_object(nested, label, &key_path, out)?,
            Value::Array(items) => {
                let mut parts = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    match scalar_text(item) {
                        Some(text) => parts.push(text),
                        None => {
                            return Err(invalid_field(
                                label,
                                &format!("{key_path}[{idx}]"),
                                "expected scalar list element",
                            ));
                        }
                    }
                }
                out.insert(key_path, parts.join(","));
            }
            scalar => {
                if let Some(text) = scalar_text(scalar) {
                    out.insert(key_path, text);
                }
            }
        }
    }
    Ok(())
}

/// Textual form of a scalar JSON value.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    label: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, SourceError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(label, path, "expected object")),
    }
}

/// Join nested paths into a dotted key.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(label: &str, path: &str, message: &str) -> SourceError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    SourceError::InvalidField {
        path: format!("{label}:{normalized_path}"),
        message: message.to_string(),
    }
}
