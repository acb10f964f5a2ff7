//! Entity formatting
//!
//! Flattens one namespaced feed element (an email, phone number, address...)
//! into a `{primary, rel, <value>...}` shape that round-trips through the
//! XML template.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Prefix Google puts in front of standard `rel` values
pub const GD_REL_PREFIX: &str = "http://schemas.google.com/g/2005#";

/// Key of a JSON text node, `{"$t": "..."}`
pub const TEXT_KEY: &str = "$t";

const NAMESPACE_PREFIXES: [&str; 2] = ["gd$", "gContact$"];

/// A flattened feed element
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormattedEntity {
    /// Whether this is the contact's primary value of its kind
    #[serde(default)]
    pub primary: bool,
    /// Relation with the standard prefix stripped (`work`, `home`, `mobile`...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    /// Everything else, keyed in snake_case
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl FormattedEntity {
    /// Create an entity with the given relation
    pub fn new(rel: Option<&str>) -> Self {
        Self {
            primary: false,
            rel: rel.map(str::to_string),
            fields: BTreeMap::new(),
        }
    }

    /// Mark as primary
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// Set a value field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String value of a field, if it is one
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Normalize one raw feed element.
///
/// `default_rel` fills in a missing `rel`; `value_key` names the field that
/// receives the element's own text node (`$t`).
pub fn format_entity(raw: &Value, default_rel: Option<&str>, value_key: Option<&str>) -> FormattedEntity {
    let mut entity = FormattedEntity::default();
    let mut rel = None;

    if let Some(map) = raw.as_object() {
        for (key, value) in map {
            match key.as_str() {
                "primary" => {
                    entity.primary = matches!(value, Value::Bool(true))
                        || value.as_str() == Some("true");
                }
                "rel" => {
                    if let Some(r) = value.as_str() {
                        rel = Some(r.strip_prefix(GD_REL_PREFIX).unwrap_or(r).to_string());
                    }
                }
                TEXT_KEY => {
                    let name = value_key
                        .map(str::to_string)
                        .unwrap_or_else(|| to_snake_case(key));
                    entity.fields.insert(name, value.clone());
                }
                _ => {
                    let name = to_snake_case(strip_namespace(key));
                    entity.fields.insert(name, unwrap_text(value).clone());
                }
            }
        }
    }

    entity.rel = rel.or_else(|| default_rel.map(str::to_string));
    entity
}

/// Drop a vendor namespace (`gd$`, `gContact$`) from a key
pub fn strip_namespace(key: &str) -> &str {
    NAMESPACE_PREFIXES
        .iter()
        .find_map(|prefix| key.strip_prefix(prefix))
        .unwrap_or(key)
}

/// The text of a `{"$t": ...}` node, or the value itself
pub(crate) fn unwrap_text(value: &Value) -> &Value {
    value.get(TEXT_KEY).unwrap_or(value)
}

/// String content of a text node
pub(crate) fn text_of(value: &Value) -> Option<&str> {
    value.get(TEXT_KEY).and_then(Value::as_str)
}

/// camelCase / kebab-case to snake_case, keeping acronyms together
/// (`formattedAddress` -> `formatted_address`, `HTTPServer` -> `http_server`).
/// Characters that cannot appear in an identifier are dropped.
pub fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == '_' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if !c.is_alphanumeric() {
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_lower);
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}
