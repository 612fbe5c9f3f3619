use super::fields::FieldMerger;
use super::operation::{
    CallbackOperation, ChatOperation, FileOperation, MessageOperation, Operation,
};
use super::send_and_wait;
use super::upload::MultipartBody;
use crate::errors::NodeError;
use crate::services::parameters::{number_value, FieldReader};
use reqwest::Method;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub endpoint: String,
    pub body: Map<String, Value>,
    pub query: Map<String, Value>,
    pub multipart: Option<MultipartBody>,
}

impl RequestSpec {
    pub fn post(endpoint: &str, body: Map<String, Value>) -> Self {
        Self {
            method: Method::POST,
            endpoint: endpoint.to_string(),
            body,
            query: Map::new(),
            multipart: None,
        }
    }
}

pub struct RequestBuilder<'a> {
    merger: FieldMerger<'a>,
    binary_data: bool,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(merger: FieldMerger<'a>, binary_data: bool) -> Self {
        Self {
            merger,
            binary_data,
        }
    }

    pub fn binary_data(&self) -> bool {
        self.binary_data
    }

    pub fn build(
        &self,
        operation: Operation,
        reader: &FieldReader<'_>,
    ) -> Result<RequestSpec, NodeError> {
        let mut body = Map::new();
        match operation {
            Operation::Chat(op) => {
                put_string(&mut body, "chat_id", reader, "chatId")?;
                match op {
                    ChatOperation::Get | ChatOperation::Administrators | ChatOperation::Leave => {}
                    ChatOperation::Member => put_string(&mut body, "user_id", reader, "userId")?,
                    ChatOperation::SetDescription => {
                        put_string(&mut body, "description", reader, "description")?
                    }
                    ChatOperation::SetTitle => put_string(&mut body, "title", reader, "title")?,
                }
            }
            Operation::Callback(op) => {
                put_string(&mut body, callback_id_field(op), reader, "queryId")?;
                if op == CallbackOperation::AnswerInlineQuery {
                    put_string(&mut body, "results", reader, "results")?;
                }
                self.merge(&mut body, reader, operation)?;
            }
            Operation::File(FileOperation::Get) => {
                put_string(&mut body, "file_id", reader, "fileId")?;
            }
            Operation::Message(op) => self.build_message(&mut body, op, operation, reader)?,
        }
        Ok(RequestSpec::post(operation.endpoint(), body))
    }

    fn merge(
        &self,
        body: &mut Map<String, Value>,
        reader: &FieldReader<'_>,
        operation: Operation,
    ) -> Result<(), NodeError> {
        self.merger.merge(body, reader, operation, self.binary_data)
    }

    fn build_message(
        &self,
        body: &mut Map<String, Value>,
        op: MessageOperation,
        operation: Operation,
        reader: &FieldReader<'_>,
    ) -> Result<(), NodeError> {
        match op {
            MessageOperation::EditMessageText => {
                if reader.string_or("messageType", "message")? == "inlineMessage" {
                    put_string(body, "inline_message_id", reader, "inlineMessageId")?;
                } else {
                    put_string(body, "chat_id", reader, "chatId")?;
                    put_string(body, "message_id", reader, "messageId")?;
                }
                put_string(body, "text", reader, "text")?;
                self.merge(body, reader, operation)?;
            }
            MessageOperation::DeleteMessage | MessageOperation::UnpinChatMessage => {
                put_string(body, "chat_id", reader, "chatId")?;
                put_string(body, "message_id", reader, "messageId")?;
            }
            MessageOperation::PinChatMessage => {
                put_string(body, "chat_id", reader, "chatId")?;
                put_string(body, "message_id", reader, "messageId")?;
                self.merge(body, reader, operation)?;
            }
            MessageOperation::SendMedia(kind) => {
                put_string(body, "chat_id", reader, "chatId")?;
                body.insert(kind.field().to_string(), Value::String(reader.string_or("file", "")?));
                self.merge(body, reader, operation)?;
            }
            MessageOperation::SendChatAction => {
                put_string(body, "chat_id", reader, "chatId")?;
                put_string(body, "action", reader, "action")?;
            }
            MessageOperation::SendContact => {
                put_string(body, "chat_id", reader, "chatId")?;
                put_string(body, "phone_number", reader, "phone_number")?;
                put_string(body, "first_name", reader, "first_name")?;
                for name in ["last_name", "vcard"] {
                    if let Some(value) = reader.non_empty_string(name)? {
                        body.insert(name.to_string(), Value::String(value));
                    }
                }
                self.merge(body, reader, operation)?;
            }
            MessageOperation::SendLocation => {
                put_string(body, "chat_id", reader, "chatId")?;
                body.insert("latitude".to_string(), number_value(reader.number("latitude")?));
                body.insert("longitude".to_string(), number_value(reader.number("longitude")?));
                self.merge(body, reader, operation)?;
            }
            MessageOperation::SendMessage => {
                put_string(body, "chat_id", reader, "chatId")?;
                put_string(body, "text", reader, "text")?;
                self.merge(body, reader, operation)?;
            }
            MessageOperation::SendMediaGroup => {
                put_string(body, "chat_id", reader, "chatId")?;
                self.merge(body, reader, operation)?;
                body.insert("media".to_string(), Value::Array(media_group(reader)?));
            }
            MessageOperation::SendPoll => {
                build_poll(body, reader)?;
                self.merge(body, reader, operation)?;
            }
            MessageOperation::SendAndWait => {
                *body = send_and_wait::build_body(reader, self.merger.context)?;
            }
        }
        Ok(())
    }
}

fn callback_id_field(op: CallbackOperation) -> &'static str {
    match op {
        CallbackOperation::AnswerQuery => "callback_query_id",
        CallbackOperation::AnswerInlineQuery => "inline_query_id",
    }
}

fn put_string(
    body: &mut Map<String, Value>,
    field: &str,
    reader: &FieldReader<'_>,
    parameter: &str,
) -> Result<(), NodeError> {
    body.insert(field.to_string(), Value::String(reader.string(parameter)?));
    Ok(())
}

/// `media.media[]` entries with their nested `additionalFields` lifted onto
/// the entry itself.
fn media_group(reader: &FieldReader<'_>) -> Result<Vec<Value>, NodeError> {
    let collection = reader.collection("media")?;
    let entries = match collection.get("media") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries.clone(),
        Some(_) => {
            return Err(NodeError::configuration("Parameter 'media.media' must be a list")
                .at_item(reader.index()))
        }
    };
    let mut media = Vec::with_capacity(entries.len());
    for entry in entries {
        let Value::Object(mut fields) = entry else {
            continue;
        };
        if let Some(Value::Object(extra)) = fields.remove("additionalFields") {
            fields.extend(extra);
        }
        media.push(Value::Object(fields));
    }
    Ok(media)
}

fn build_poll(body: &mut Map<String, Value>, reader: &FieldReader<'_>) -> Result<(), NodeError> {
    put_string(body, "chat_id", reader, "chatId")?;
    put_string(body, "question", reader, "question")?;

    let options = reader.collection("options")?;
    if let Some(Value::Array(entries)) = options.get("option") {
        let texts: Vec<Value> = entries
            .iter()
            .map(|entry| entry.get("text").cloned().unwrap_or(Value::Null))
            .collect();
        let encoded = serde_json::to_string(&texts)
            .map_err(|err| NodeError::internal(format!("Failed to encode poll options: {}", err)))?;
        body.insert("options".to_string(), Value::String(encoded));
    }

    let poll_type = reader.string_or("type", "regular")?;
    if poll_type == "quiz" {
        body.insert("type".to_string(), Value::from("quiz"));
        body.insert(
            "correct_option_id".to_string(),
            number_value(reader.number_or("correct_option_id", 0.0)?),
        );
        if let Some(explanation) = reader.non_empty_string("explanation")? {
            body.insert("explanation".to_string(), Value::String(explanation));
        }
    }

    body.insert(
        "is_anonymous".to_string(),
        Value::Bool(reader.bool_or("is_anonymous", true)?),
    );
    if poll_type == "regular" && reader.bool_or("allows_multiple_answers", false)? {
        body.insert("allows_multiple_answers".to_string(), Value::Bool(true));
    }
    for name in ["open_period", "close_date"] {
        let value = reader.number_or(name, 0.0)?;
        if value > 0.0 {
            body.insert(name.to_string(), number_value(value));
        }
    }
    if reader.bool_or("is_closed", false)? {
        body.insert("is_closed".to_string(), Value::Bool(true));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::telegram::context::NodeContext;
    use crate::managers::telegram::schema::parameter_default;
    use crate::services::logger::Logger;
    use crate::services::parameters::NodeParameters;

    fn build(resource: &str, operation: &str, params: Value) -> Result<RequestSpec, NodeError> {
        let context = NodeContext::default().with_attribution_allowed(false);
        let logger = Logger::new("test");
        let params = NodeParameters::new(params);
        let reader = FieldReader::new(&params, 0).with_defaults(parameter_default);
        let op = Operation::parse(resource, operation)?;
        RequestBuilder::new(FieldMerger::new(&context, &logger), false).build(op, &reader)
    }

    fn keys(spec: &RequestSpec) -> Vec<&str> {
        spec.body.keys().map(String::as_str).collect()
    }

    #[test]
    fn chat_member_sends_exactly_chat_and_user() {
        let spec = build(
            "chat",
            "member",
            serde_json::json!({ "chatId": "-100", "userId": "7", "text": "ignored" }),
        )
        .unwrap();
        assert_eq!(spec.method, Method::POST);
        assert_eq!(spec.endpoint, "getChatMember");
        assert_eq!(keys(&spec), vec!["chat_id", "user_id"]);
    }

    #[test]
    fn contact_optional_fields_only_when_non_empty() {
        let spec = build(
            "message",
            "sendContact",
            serde_json::json!({
                "chatId": "1", "phone_number": "+100", "first_name": "Ada", "last_name": ""
            }),
        )
        .unwrap();
        assert_eq!(keys(&spec), vec!["chat_id", "first_name", "phone_number"]);

        let spec = build(
            "message",
            "sendContact",
            serde_json::json!({
                "chatId": "1", "phone_number": "+100", "first_name": "Ada",
                "last_name": "Lovelace", "vcard": "BEGIN:VCARD"
            }),
        )
        .unwrap();
        assert_eq!(spec.body["last_name"], "Lovelace");
        assert_eq!(spec.body["vcard"], "BEGIN:VCARD");
    }

    #[test]
    fn edit_inline_message_uses_inline_id() {
        let spec = build(
            "message",
            "editMessageText",
            serde_json::json!({
                "messageType": "inlineMessage", "inlineMessageId": "abc", "text": "new"
            }),
        )
        .unwrap();
        assert_eq!(keys(&spec), vec!["inline_message_id", "text"]);
    }

    #[test]
    fn quiz_poll_fields() {
        let spec = build(
            "message",
            "sendPoll",
            serde_json::json!({
                "chatId": "1",
                "question": "2+2?",
                "options": { "option": [{ "text": "3" }, { "text": "4" }] },
                "type": "quiz",
                "correct_option_id": 1,
                "allows_multiple_answers": true,
                "open_period": 0,
                "close_date": 1_900_000_000
            }),
        )
        .unwrap();
        assert_eq!(spec.body["options"], r#"["3","4"]"#);
        assert_eq!(spec.body["type"], "quiz");
        assert_eq!(spec.body["correct_option_id"], 1);
        assert_eq!(spec.body["is_anonymous"], true);
        assert_eq!(spec.body["close_date"], 1_900_000_000_i64);
        assert!(spec.body.get("allows_multiple_answers").is_none());
        assert!(spec.body.get("open_period").is_none());
        assert!(spec.body.get("explanation").is_none());
        assert!(spec.body.get("is_closed").is_none());
    }

    #[test]
    fn regular_poll_allows_multiple_answers_when_true() {
        let spec = build(
            "message",
            "sendPoll",
            serde_json::json!({
                "chatId": "1", "question": "q", "allows_multiple_answers": true,
                "is_anonymous": false, "is_closed": true
            }),
        )
        .unwrap();
        assert_eq!(spec.body["allows_multiple_answers"], true);
        assert_eq!(spec.body["is_anonymous"], false);
        assert_eq!(spec.body["is_closed"], true);
        assert!(spec.body.get("type").is_none());
    }

    #[test]
    fn media_group_flattens_entry_fields() {
        let spec = build(
            "message",
            "sendMediaGroup",
            serde_json::json!({
                "chatId": "1",
                "media": { "media": [
                    { "type": "photo", "media": "file-1", "additionalFields": { "caption": "one" } },
                    { "type": "video", "media": "file-2" }
                ] }
            }),
        )
        .unwrap();
        assert_eq!(
            spec.body["media"],
            serde_json::json!([
                { "type": "photo", "media": "file-1", "caption": "one" },
                { "type": "video", "media": "file-2" }
            ])
        );
        assert!(spec.body.get("reply_markup").is_none());
    }

    #[test]
    fn location_coordinates_are_numbers() {
        let spec = build(
            "message",
            "sendLocation",
            serde_json::json!({ "chatId": "1", "latitude": "52.52", "longitude": 13 }),
        )
        .unwrap();
        assert_eq!(spec.body["latitude"], 52.52);
        assert_eq!(spec.body["longitude"], 13);
    }

    #[test]
    fn answer_inline_query_with_callback_fields() {
        let spec = build(
            "callback",
            "answerInlineQuery",
            serde_json::json!({
                "queryId": "q1",
                "results": "[]",
                "additionalFields": { "cache_time": 5, "caption": "not a callback field" }
            }),
        )
        .unwrap();
        assert_eq!(spec.endpoint, "answerInlineQuery");
        assert_eq!(keys(&spec), vec!["cache_time", "inline_query_id", "results"]);
    }

    #[test]
    fn missing_required_parameter_names_it() {
        let err = build("file", "get", serde_json::json!({})).unwrap_err();
        assert!(err.message.contains("fileId"));
    }
}
