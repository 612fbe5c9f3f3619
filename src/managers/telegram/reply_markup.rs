use crate::errors::NodeError;
use crate::services::parameters::FieldReader;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebApp {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlineButtonFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_inline_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_inline_query_current_chat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_app: Option<WebApp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyButtonFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_contact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_location: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_app: Option<WebApp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button<F> {
    pub text: String,
    #[serde(flatten)]
    pub fields: F,
}

pub type InlineButton = Button<InlineButtonFields>;
pub type ReplyButton = Button<ReplyButtonFields>;

/// Keyboard rows either built from fields or typed by hand as JSON. The JSON
/// text is forwarded as-is; the Bot API is the one that validates it.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyboardSource<F> {
    Json(String),
    Rows(Vec<Vec<Button<F>>>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceReplyOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_reply: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selective: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyKeyboardOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize_keyboard: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_time_keyboard: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selective: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyKeyboardRemoveOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_keyboard: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selective: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplyMarkup {
    None,
    ForceReply(ForceReplyOptions),
    InlineKeyboard(KeyboardSource<InlineButtonFields>),
    ReplyKeyboard(KeyboardSource<ReplyButtonFields>, ReplyKeyboardOptions),
    ReplyKeyboardRemove(ReplyKeyboardRemoveOptions),
}

// Host-side shape of the keyboard builder: rows[].row.buttons[] where each
// button keeps its optional fields under `additionalFields`.
#[derive(Debug, Default, Deserialize)]
struct KeyboardParam {
    #[serde(default)]
    rows: Vec<RowParam>,
}

#[derive(Debug, Default, Deserialize)]
struct RowParam {
    #[serde(default)]
    row: Option<ButtonsParam>,
}

#[derive(Debug, Default, Deserialize)]
struct ButtonsParam {
    #[serde(default)]
    buttons: Vec<ButtonParam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ButtonParam {
    #[serde(default)]
    text: String,
    #[serde(default)]
    additional_fields: Option<Value>,
}

impl ReplyMarkup {
    pub fn from_parameters(reader: &FieldReader<'_>, allowed: &[&str]) -> Result<Self, NodeError> {
        let selector = reader.string_or("replyMarkup", "none")?;
        if !allowed.contains(&selector.as_str()) {
            return Err(NodeError::configuration(format!(
                "Reply markup \"{}\" is not supported here; use one of: {}",
                selector,
                allowed.join(", ")
            ))
            .at_item(reader.index()));
        }
        let markup = match selector.as_str() {
            "none" => ReplyMarkup::None,
            "forceReply" => ReplyMarkup::ForceReply(read_options(reader, "forceReply")?),
            "inlineKeyboard" => {
                ReplyMarkup::InlineKeyboard(read_keyboard(reader, "inlineKeyboard")?)
            }
            "replyKeyboard" => ReplyMarkup::ReplyKeyboard(
                read_keyboard(reader, "replyKeyboard")?,
                read_options(reader, "replyKeyboardOptions")?,
            ),
            "replyKeyboardRemove" => {
                ReplyMarkup::ReplyKeyboardRemove(read_options(reader, "replyKeyboardRemove")?)
            }
            other => {
                return Err(NodeError::configuration(format!(
                    "Unknown reply markup \"{}\"",
                    other
                ))
                .at_item(reader.index()))
            }
        };
        Ok(markup)
    }

    pub fn to_value(&self) -> Result<Option<Value>, NodeError> {
        let value = match self {
            ReplyMarkup::None => return Ok(None),
            ReplyMarkup::ForceReply(options) => to_json(options)?,
            ReplyMarkup::ReplyKeyboardRemove(options) => to_json(options)?,
            ReplyMarkup::InlineKeyboard(KeyboardSource::Json(raw)) => Value::String(raw.clone()),
            ReplyMarkup::InlineKeyboard(KeyboardSource::Rows(rows)) => {
                let mut map = Map::new();
                map.insert("inline_keyboard".to_string(), to_json(rows)?);
                Value::Object(map)
            }
            ReplyMarkup::ReplyKeyboard(KeyboardSource::Json(raw), _) => Value::String(raw.clone()),
            ReplyMarkup::ReplyKeyboard(KeyboardSource::Rows(rows), options) => {
                let mut map = Map::new();
                map.insert("keyboard".to_string(), to_json(rows)?);
                if let Value::Object(extra) = to_json(options)? {
                    map.extend(extra);
                }
                Value::Object(map)
            }
        };
        Ok(Some(value))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, NodeError> {
    serde_json::to_value(value)
        .map_err(|err| NodeError::internal(format!("Failed to encode reply markup: {}", err)))
}

fn read_options<T: for<'de> Deserialize<'de> + Default>(
    reader: &FieldReader<'_>,
    name: &str,
) -> Result<T, NodeError> {
    let raw = reader.collection(name)?;
    serde_json::from_value(Value::Object(raw)).map_err(|err| {
        NodeError::configuration(format!("Invalid '{}' options: {}", name, err))
            .at_item(reader.index())
    })
}

fn read_keyboard<F: for<'de> Deserialize<'de> + Default>(
    reader: &FieldReader<'_>,
    name: &str,
) -> Result<KeyboardSource<F>, NodeError> {
    if reader.string_or("specifyKeyboard", "ui")? == "json" {
        return Ok(KeyboardSource::Json(reader.string_or("keyboardJson", "")?));
    }
    let param: KeyboardParam = serde_json::from_value(Value::Object(reader.collection(name)?))
        .map_err(|err| {
            NodeError::configuration(format!("Invalid '{}' keyboard: {}", name, err))
                .at_item(reader.index())
        })?;
    let mut rows = Vec::new();
    for row in param.rows {
        let buttons = row.row.map(|r| r.buttons).unwrap_or_default();
        if buttons.is_empty() {
            continue;
        }
        let mut out = Vec::with_capacity(buttons.len());
        for button in buttons {
            let fields = match button.additional_fields {
                Some(raw) if !raw.is_null() => serde_json::from_value(raw).map_err(|err| {
                    NodeError::configuration(format!("Invalid button '{}': {}", button.text, err))
                        .at_item(reader.index())
                })?,
                _ => F::default(),
            };
            out.push(Button {
                text: button.text,
                fields,
            });
        }
        rows.push(out);
    }
    Ok(KeyboardSource::Rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parameters::NodeParameters;

    const ALL: &[&str] = &[
        "none",
        "forceReply",
        "inlineKeyboard",
        "replyKeyboard",
        "replyKeyboardRemove",
    ];

    fn markup(params: Value) -> Result<Option<Value>, NodeError> {
        let params = NodeParameters::new(params);
        ReplyMarkup::from_parameters(&FieldReader::new(&params, 0), ALL)?.to_value()
    }

    #[test]
    fn none_attaches_nothing() {
        assert_eq!(markup(serde_json::json!({})).unwrap(), None);
    }

    #[test]
    fn inline_keyboard_rows_become_array_of_arrays() {
        let value = markup(serde_json::json!({
            "replyMarkup": "inlineKeyboard",
            "inlineKeyboard": {
                "rows": [
                    { "row": { "buttons": [
                        { "text": "Yes", "additionalFields": { "callback_data": "yes" } }
                    ] } },
                    { "row": { "buttons": [] } },
                    { "row": { "buttons": [
                        { "text": "Docs", "additionalFields": { "url": "https://core.telegram.org" } }
                    ] } }
                ]
            }
        }))
        .unwrap()
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "inline_keyboard": [
                    [{ "text": "Yes", "callback_data": "yes" }],
                    [{ "text": "Docs", "url": "https://core.telegram.org" }]
                ]
            })
        );
    }

    #[test]
    fn reply_keyboard_merges_options() {
        let value = markup(serde_json::json!({
            "replyMarkup": "replyKeyboard",
            "replyKeyboard": {
                "rows": [{ "row": { "buttons": [
                    { "text": "Share", "additionalFields": { "request_contact": true } }
                ] } }]
            },
            "replyKeyboardOptions": { "resize_keyboard": true }
        }))
        .unwrap()
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "keyboard": [[{ "text": "Share", "request_contact": true }]],
                "resize_keyboard": true
            })
        );
    }

    #[test]
    fn json_keyboard_passes_invalid_text_through() {
        let raw = "{\"inline_keyboard\": [[{\"text\": \"x\"";
        let value = markup(serde_json::json!({
            "replyMarkup": "inlineKeyboard",
            "specifyKeyboard": "json",
            "keyboardJson": raw
        }))
        .unwrap()
        .unwrap();
        assert_eq!(value, Value::String(raw.to_string()));
    }

    #[test]
    fn force_reply_passes_options() {
        let value = markup(serde_json::json!({
            "replyMarkup": "forceReply",
            "forceReply": { "force_reply": true }
        }))
        .unwrap()
        .unwrap();
        assert_eq!(value, serde_json::json!({ "force_reply": true }));
    }

    #[test]
    fn disallowed_selector_is_configuration_error() {
        let params = NodeParameters::new(serde_json::json!({ "replyMarkup": "replyKeyboard" }));
        let err = ReplyMarkup::from_parameters(
            &FieldReader::new(&params, 3),
            &["none", "inlineKeyboard"],
        )
        .unwrap_err();
        assert_eq!(err.item_index, Some(3));
    }
}
