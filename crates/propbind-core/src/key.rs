//! Derivation of configuration keys from accessor names.

/// Rule turning an accessor name into the field token of its key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyNaming {
    /// Strip a `get`/`is` verb and convert to lowerCamelCase:
    /// `get_sub_config` and `getSubConfig` both become `subConfig`.
    #[default]
    Getter,
    /// Use the accessor name unchanged.
    Verbatim,
}

impl KeyNaming {
    /// Field token for an accessor name under this rule.
    pub fn field_token(self, accessor: &str) -> String {
        match self {
            Self::Getter => getter_token(accessor),
            Self::Verbatim => accessor.to_string(),
        }
    }
}

/// Join an optional prefix and a field token into a dotted key.
///
/// An empty prefix is treated as no prefix.
pub fn derive_key(prefix: Option<&str>, token: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}.{token}"),
        _ => token.to_string(),
    }
}

fn getter_token(accessor: &str) -> String {
    let camel = snake_to_camel(strip_verb(accessor));
    if camel.is_empty() {
        return accessor.to_string();
    }
    decapitalize(&camel)
}

fn strip_verb(accessor: &str) -> &str {
    for verb in ["get_", "is_"] {
        if let Some(rest) = accessor.strip_prefix(verb) {
            return rest;
        }
    }
    for verb in ["get", "is"] {
        if let Some(rest) = accessor.strip_prefix(verb)
            && rest.starts_with(|ch: char| ch.is_ascii_uppercase())
        {
            return rest;
        }
    }
    accessor
}

fn snake_to_camel(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut upper_next = false;
    for ch in token.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Lowercase the first character unless the token starts with an acronym.
fn decapitalize(token: &str) -> String {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            token.to_string()
        }
        (Some(first), _) => first
            .to_lowercase()
            .chain(token[first.len_utf8()..].chars())
            .collect(),
        (None, _) => String::new(),
    }
}
