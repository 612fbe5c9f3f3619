use super::operation::MediaKind;
use crate::constants::node::DEFAULT_BINARY_PROPERTY;
use crate::errors::NodeError;
use crate::services::binary_store::{load_binary, BinaryStore};
use crate::services::items::Item;
use crate::services::parameters::FieldReader;
use bytes::Bytes;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub file: FilePart,
}

impl MultipartBody {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Builds the multipart form for `item`. Every body field travels as text;
/// nested values (such as `reply_markup`) are JSON-encoded because form
/// fields cannot nest.
pub async fn build_multipart(
    body: Map<String, Value>,
    item: &Item,
    reader: &FieldReader<'_>,
    kind: MediaKind,
    store: &dyn BinaryStore,
) -> Result<MultipartBody, NodeError> {
    let index = reader.index();
    let property = reader.string_or("binaryPropertyName", DEFAULT_BINARY_PROPERTY)?;
    let binary = item.binary.get(&property).ok_or_else(|| {
        NodeError::configuration(format!(
            "This operation expects the node's input data to contain a binary file '{}', but none was found",
            property
        ))
        .at_item(index)
    })?;

    let file_name = reader
        .non_empty_string("additionalFields.fileName")?
        .or_else(|| binary.file_name.clone().filter(|name| !name.is_empty()))
        .ok_or_else(|| {
            NodeError::configuration(format!(
                "File name is needed to {}",
                kind.endpoint()
            ))
            .with_hint(
                "Set the file name on the binary property, or set File Name under Additional Fields.",
            )
            .at_item(index)
        })?;

    let bytes = load_binary(store, binary).await.map_err(|err| err.at_item(index))?;

    let mut fields = Vec::with_capacity(body.len() + 1);
    let mut has_disable_notification = false;
    for (name, value) in body {
        if name == kind.field() {
            continue;
        }
        if name == "disable_notification" {
            has_disable_notification = true;
        }
        if let Some(text) = form_text(&value)? {
            fields.push((name, text));
        }
    }
    if !has_disable_notification {
        fields.push(("disable_notification".to_string(), "false".to_string()));
    }

    Ok(MultipartBody {
        fields,
        file: FilePart {
            field: kind.field().to_string(),
            file_name,
            content_type: binary.mime_type.clone(),
            bytes,
        },
    })
}

fn form_text(value: &Value) -> Result<Option<String>, NodeError> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(num) => num.to_string(),
        nested => serde_json::to_string(nested)
            .map_err(|err| NodeError::internal(format!("Failed to encode form field: {}", err)))?,
    };
    Ok(Some(text))
}
