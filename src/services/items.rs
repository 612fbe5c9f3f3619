//! Host item model: what a node receives and what it hands back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Binary attachment on an item. Either `id` points into the host's binary
/// store or `data` carries the bytes inline, base64-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

fn default_mime_type() -> String {
    "application/octet-stream".to_string()
}

impl BinaryData {
    pub fn inline(bytes: &[u8], file_name: Option<&str>, mime_type: &str) -> Self {
        use base64::Engine;
        let file_extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase());
        Self {
            id: None,
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            file_name: file_name.map(|name| name.to_string()),
            mime_type: mime_type.to_string(),
            file_extension,
            file_size: Some(bytes.len() as u64),
        }
    }

    pub fn stored(id: &str, file_name: Option<&str>, mime_type: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            data: String::new(),
            file_name: file_name.map(|name| name.to_string()),
            mime_type: mime_type.to_string(),
            file_extension: None,
            file_size: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default = "empty_object")]
    pub json: Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub binary: BTreeMap<String, BinaryData>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl Item {
    pub fn new(json: Value) -> Self {
        Self {
            json,
            binary: BTreeMap::new(),
        }
    }

    pub fn with_binary(mut self, property: &str, data: BinaryData) -> Self {
        self.binary.insert(property.to_string(), data);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    pub item: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub json: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<BTreeMap<String, BinaryData>>,
    pub paired_item: PairedItem,
}

impl OutputItem {
    pub fn success(index: usize, json: Value) -> Self {
        Self {
            json,
            binary: None,
            paired_item: PairedItem { item: index },
        }
    }

    pub fn with_binary(mut self, property: &str, data: BinaryData) -> Self {
        self.binary
            .get_or_insert_with(BTreeMap::new)
            .insert(property.to_string(), data);
        self
    }

    pub fn failure(index: usize, message: &str) -> Self {
        Self::success(index, serde_json::json!({ "error": message }))
    }

    pub fn error_message(&self) -> Option<&str> {
        let obj = self.json.as_object()?;
        if obj.len() != 1 {
            return None;
        }
        obj.get("error").and_then(Value::as_str)
    }

    pub fn source_index(&self) -> usize {
        self.paired_item.item
    }
}

/// Turns a response value into items the way the host does: arrays fan out
/// into one item per element, anything else becomes a single item. Scalars
/// are wrapped so every item carries an object.
pub fn json_to_items(index: usize, value: Value) -> Vec<OutputItem> {
    match value {
        Value::Array(entries) => entries
            .into_iter()
            .map(|entry| OutputItem::success(index, wrap_scalar(entry)))
            .collect(),
        other => vec![OutputItem::success(index, wrap_scalar(other))],
    }
}

fn wrap_scalar(value: Value) -> Value {
    if value.is_object() {
        value
    } else {
        serde_json::json!({ "data": value })
    }
}
