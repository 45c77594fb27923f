//! Value fetching and rendering
//!
//! The key's `TYPE` selects a [`ValueKind`], which owns the command used to
//! read it. Values are rendered as two-space pretty JSON; any string holding a
//! JSON object or array is parsed and rendered in place.

use serde_json::{Map, Value};

use crate::error::{Result, ViewerError};
use crate::store::NodeClient;

/// Redis value types the viewer can display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    String,
    List,
    Set,
    SortedSet,
    Hash,
    Unsupported(String),
}

impl ValueKind {
    /// Map a `TYPE` reply to a kind.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "string" => ValueKind::String,
            "list" => ValueKind::List,
            "set" => ValueKind::Set,
            "zset" => ValueKind::SortedSet,
            "hash" => ValueKind::Hash,
            other => ValueKind::Unsupported(other.to_string()),
        }
    }

    /// Read `key` from `node` as JSON.
    ///
    /// Bytes that are not valid UTF-8 are shown with replacement characters.
    pub async fn fetch(&self, node: &dyn NodeClient, key: &[u8]) -> Result<Value> {
        match self {
            ValueKind::String => node
                .get(key)
                .await?
                .map(|value| Value::String(lossy(value)))
                .ok_or_else(|| ViewerError::KeyVanished {
                    key: String::from_utf8_lossy(key).into_owned(),
                }),
            ValueKind::List => Ok(strings(node.list_range(key).await?)),
            ValueKind::Set => Ok(strings(node.set_members(key).await?)),
            ValueKind::SortedSet => Ok(strings(node.sorted_set_range(key).await?)),
            ValueKind::Hash => {
                // BTreeMap iteration keeps the object key-sorted
                let fields = node.hash_all(key).await?;
                let object: Map<String, Value> = fields
                    .into_iter()
                    .map(|(field, value)| (lossy(field), Value::String(lossy(value))))
                    .collect();
                Ok(Value::Object(object))
            }
            ValueKind::Unsupported(key_type) => Err(ViewerError::UnsupportedType {
                key_type: key_type.clone(),
            }),
        }
    }
}

fn lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn strings(items: Vec<Vec<u8>>) -> Value {
    Value::Array(items.into_iter().map(|item| Value::String(lossy(item))).collect())
}

/// Pretty-print a value with embedded JSON expanded.
pub fn render_value(value: Value) -> String {
    let expanded = expand_inner_json(value);
    serde_json::to_string_pretty(&expanded).unwrap_or_else(|e| e.to_string())
}

/// Replace strings that hold a JSON object or array with the parsed value.
pub fn expand_inner_json(value: Value) -> Value {
    match value {
        Value::String(text) => match parse_embedded(&text) {
            Some(inner) => expand_inner_json(inner),
            None => Value::String(text),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(expand_inner_json).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k, expand_inner_json(v)))
                .collect(),
        ),
        other => other,
    }
}

fn parse_embedded(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    let looks_like_json = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if !looks_like_json {
        return None;
    }
    serde_json::from_str::<Value>(trimmed)
        .ok()
        .filter(|v| v.is_object() || v.is_array())
}
