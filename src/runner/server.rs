use crate::app::App;
use crate::errors::{ErrorCode, NodeError, RpcError};
use crate::managers::telegram::operation::Operation;
use crate::managers::telegram::schema::{reply_markup_choices, visible_fields, VisibilityContext};
use crate::runner::job::{validate_params, DescribeRequest, ExecuteJob};
use crate::runner::protocol::{JsonRpcRequest, JsonRpcResponse};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

const SERVER_NAME: &str = "telegram-node";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct NodeServer {
    app: Arc<App>,
}

impl NodeServer {
    pub fn new(app: App) -> Self {
        Self { app: Arc::new(app) }
    }

    fn handle_describe(&self, params: Value) -> Result<Value, RpcError> {
        validate_params("describe", &params)?;
        let request: DescribeRequest = serde_json::from_value(params)
            .map_err(|err| RpcError::new(ErrorCode::InvalidParams, err.to_string()))?;
        let operation = Operation::parse(&request.resource, &request.operation)
            .map_err(|err| RpcError::new(ErrorCode::InvalidParams, render_node_error(&err)))?;
        let visibility = VisibilityContext {
            operation,
            binary_data: request.binary_data,
        };
        Ok(serde_json::json!({
            "server": { "name": SERVER_NAME, "version": SERVER_VERSION },
            "resource": operation.resource().as_str(),
            "operation": operation.name(),
            "endpoint": operation.endpoint(),
            "binaryUpload": request.binary_data && operation.media_kind().is_some(),
            "additionalFields": visible_fields(&visibility),
            "replyMarkup": reply_markup_choices(operation),
        }))
    }

    async fn handle_execute(&self, params: Value) -> Result<Value, (RpcError, Option<Value>)> {
        validate_params("execute", &params).map_err(|err| (err, None))?;
        let job: ExecuteJob = serde_json::from_value(params)
            .map_err(|err| (RpcError::new(ErrorCode::InvalidParams, err.to_string()), None))?;
        match self.app.execute(job).await {
            Ok(outcome) => serde_json::to_value(&outcome).map_err(|err| {
                (RpcError::new(ErrorCode::InternalError, err.to_string()), None)
            }),
            Err(err) => {
                let data = serde_json::to_value(&err).ok();
                Err((
                    RpcError::new(ErrorCode::ExecutionFailed, render_node_error(&err)),
                    data,
                ))
            }
        }
    }

    /// Handles one input line; `None` when the line needs no answer.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let parsed: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(_) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::ParseError.as_i32(),
                    "Parse error".to_string(),
                ))
            }
        };
        let request: JsonRpcRequest = match serde_json::from_value(parsed) {
            Ok(req) => req,
            Err(_) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::InvalidRequest.as_i32(),
                    "Invalid request".to_string(),
                ))
            }
        };
        let id = request.id.clone()?;

        let response = match request.method.as_str() {
            "describe" => match self.handle_describe(request.params) {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(err) => JsonRpcResponse::failure(id, err.code.as_i32(), err.message),
            },
            "execute" => match self.handle_execute(request.params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err((err, data)) => {
                    JsonRpcResponse::failure_with_data(id, err.code.as_i32(), err.message, data)
                }
            },
            _ => JsonRpcResponse::failure(
                id,
                ErrorCode::MethodNotFound.as_i32(),
                "Method not found".to_string(),
            ),
        };
        Some(response)
    }

    pub async fn run_stdio(&self) -> Result<(), NodeError> {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin).lines();
        let mut writer = BufWriter::new(stdout);

        while let Some(line) = reader.next_line().await? {
            if let Some(response) = self.handle_line(&line).await {
                let payload = serde_json::to_string(&response).unwrap_or_default();
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        self.app.logger.debug("stdin closed", Some(&self.app.logger.stats()));
        Ok(())
    }
}

fn render_node_error(err: &NodeError) -> String {
    let mut lines = vec![err.message.clone()];
    if let Some(description) = &err.description {
        lines.push(format!("description: {}", description));
    }
    if let Some(index) = err.item_index {
        lines.push(format!("item: {}", index));
    }
    if let Some(hint) = &err.hint {
        lines.push(format!("hint: {}", hint));
    }
    lines.join("\n")
}

pub async fn run_stdio() -> Result<(), NodeError> {
    let server = NodeServer::new(App::initialize()?);
    server.run_stdio().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::credentials::TelegramCredentials;
    use crate::services::logger::Logger;
    use crate::services::transport::{HttpTransport, TelegramTransport};
    use crate::stores::memory_binary_store::MemoryBinaryStore;

    fn server() -> NodeServer {
        let factory: crate::app::TransportFactory =
            Arc::new(|logger: &Logger, credentials: TelegramCredentials| {
                Arc::new(HttpTransport::new(logger.clone(), credentials))
                    as Arc<dyn TelegramTransport>
            });
        NodeServer::new(App::with_parts(
            Logger::new("test"),
            Arc::new(MemoryBinaryStore::new()),
            None,
            factory,
        ))
    }

    async fn call(line: &str) -> Value {
        let response = server().handle_line(line).await.expect("response");
        serde_json::to_value(&response).unwrap()
    }

    #[tokio::test]
    async fn describe_lists_visible_fields() {
        let response = call(
            r#"{"jsonrpc":"2.0","id":1,"method":"describe","params":{"resource":"message","operation":"sendPhoto","binaryData":true}}"#,
        )
        .await;
        let result = &response["result"];
        assert_eq!(result["endpoint"], "sendPhoto");
        assert_eq!(result["binaryUpload"], true);
        let names: Vec<&str> = result["additionalFields"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|field| field["name"].as_str())
            .collect();
        assert!(names.contains(&"caption"));
        assert!(names.contains(&"fileName"));
        assert!(!names.contains(&"performer"));
    }

    #[tokio::test]
    async fn parse_errors_and_unknown_methods() {
        let response = call("{not json").await;
        assert_eq!(response["error"]["code"], -32700);
        let response = call(r#"{"jsonrpc":"2.0","id":2,"method":"nope"}"#).await;
        assert_eq!(response["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn notifications_get_no_answer() {
        let line = r#"{"jsonrpc":"2.0","method":"describe","params":{}}"#;
        assert!(server().handle_line(line).await.is_none());
    }

    #[tokio::test]
    async fn execute_without_credentials_reports_structured_error() {
        let response = call(
            r#"{"jsonrpc":"2.0","id":3,"method":"execute","params":{"parameters":{"resource":"chat","operation":"get","chatId":"1"}}}"#,
        )
        .await;
        assert_eq!(response["error"]["code"], -32000);
        assert_eq!(response["error"]["data"]["kind"], "configuration");
    }
}
