use super::operation::{ChatOperation, FileOperation, Operation};
use crate::constants::node as node_constants;
use crate::errors::NodeError;
use crate::services::items::{json_to_items, BinaryData, OutputItem};
use crate::services::parameters::FieldReader;
use crate::services::transport::TelegramTransport;
use crate::utils::text::last_path_segment;
use serde_json::Value;

pub async fn map_response(
    operation: Operation,
    response: Value,
    reader: &FieldReader<'_>,
    transport: &dyn TelegramTransport,
) -> Result<Vec<OutputItem>, NodeError> {
    let index = reader.index();
    match operation {
        Operation::File(FileOperation::Get) if reader.bool_or("download", true)? => {
            let item = download(response, index, transport).await?;
            Ok(vec![item])
        }
        Operation::Chat(ChatOperation::Administrators) => match response.get("result") {
            Some(Value::Array(admins)) => Ok(json_to_items(index, Value::Array(admins.clone()))),
            _ => Ok(json_to_items(index, response)),
        },
        _ => Ok(json_to_items(index, response)),
    }
}

async fn download(
    response: Value,
    index: usize,
    transport: &dyn TelegramTransport,
) -> Result<OutputItem, NodeError> {
    let file_path = response
        .pointer("/result/file_path")
        .and_then(Value::as_str)
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            NodeError::api("Telegram did not return a file path for this file")
                .with_hint("Files larger than 20 MB cannot be downloaded through the Bot API.")
                .at_item(index)
        })?;

    let bytes = transport
        .fetch_file(&file_path)
        .await
        .map_err(|err| err.at_item(index))?;
    let file_name = last_path_segment(&file_path).unwrap_or(&file_path);
    let mime = mime_guess::from_path(file_name).first_or_octet_stream();
    let data = BinaryData::inline(&bytes, Some(file_name), mime.essence_str());

    Ok(OutputItem::success(index, response)
        .with_binary(node_constants::DOWNLOAD_BINARY_PROPERTY, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::telegram::request::RequestSpec;
    use crate::services::parameters::NodeParameters;
    use async_trait::async_trait;
    use bytes::Bytes;

    struct FileServer;

    #[async_trait]
    impl TelegramTransport for FileServer {
        async fn call(&self, _request: RequestSpec) -> Result<Value, NodeError> {
            Err(NodeError::internal("unused"))
        }

        async fn fetch_file(&self, file_path: &str) -> Result<Bytes, NodeError> {
            assert_eq!(file_path, "photos/file_7.jpg");
            Ok(Bytes::from_static(b"jpeg-bytes"))
        }
    }

    fn file_response() -> Value {
        serde_json::json!({
            "ok": true,
            "result": { "file_id": "f", "file_path": "photos/file_7.jpg" }
        })
    }

    #[tokio::test]
    async fn file_get_downloads_into_data_property() {
        let params = NodeParameters::new(serde_json::json!({}));
        let op = Operation::parse("file", "get").unwrap();
        let items = map_response(op, file_response(), &FieldReader::new(&params, 3), &FileServer)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        let binary = &items[0].binary.as_ref().unwrap()["data"];
        assert_eq!(binary.file_name.as_deref(), Some("file_7.jpg"));
        assert_eq!(binary.mime_type, "image/jpeg");
        assert_eq!(items[0].source_index(), 3);
        assert_eq!(items[0].json, file_response());
    }

    #[tokio::test]
    async fn file_get_without_download_returns_json() {
        let params = NodeParameters::new(serde_json::json!({ "download": false }));
        let op = Operation::parse("file", "get").unwrap();
        let items = map_response(op, file_response(), &FieldReader::new(&params, 0), &FileServer)
            .await
            .unwrap();
        assert!(items[0].binary.is_none());
    }

    #[tokio::test]
    async fn administrators_fan_out() {
        let params = NodeParameters::new(serde_json::json!({}));
        let op = Operation::parse("chat", "administrators").unwrap();
        let response = serde_json::json!({
            "ok": true,
            "result": [{ "user": { "id": 1 } }, { "user": { "id": 2 } }]
        });
        let items = map_response(op, response, &FieldReader::new(&params, 4), &FileServer)
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.source_index() == 4));
        assert_eq!(items[1].json["user"]["id"], 2);
    }
}
