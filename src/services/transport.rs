use crate::constants::{env as env_keys, network};
use crate::errors::NodeError;
use crate::managers::telegram::request::RequestSpec;
use crate::managers::telegram::upload::MultipartBody;
use crate::services::credentials::TelegramCredentials;
use crate::services::logger::Logger;
use crate::utils::redact::{redact_preview, redact_token};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Seam to the remote Bot API.
#[async_trait]
pub trait TelegramTransport: Send + Sync {
    async fn call(&self, request: RequestSpec) -> Result<Value, NodeError>;

    /// Raw content of a file previously resolved with `getFile`.
    async fn fetch_file(&self, file_path: &str) -> Result<Bytes, NodeError>;
}

pub struct HttpTransport {
    logger: Logger,
    credentials: TelegramCredentials,
    timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl HttpTransport {
    pub fn new(logger: Logger, credentials: TelegramCredentials) -> Self {
        Self {
            logger: logger.child("transport"),
            credentials,
            timeout: Duration::from_millis(resolve_timeout_ms()),
            client: Mutex::new(None),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn get_client(&self) -> Result<Client, NodeError> {
        let mut guard = self
            .client
            .lock()
            .map_err(|_| NodeError::internal("Failed to access HTTP client cache"))?;
        if let Some(existing) = guard.as_ref() {
            return Ok(existing.clone());
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|err| NodeError::internal(format!("Failed to build HTTP client: {}", err)))?;
        *guard = Some(client.clone());
        Ok(client)
    }
}

fn resolve_timeout_ms() -> u64 {
    std::env::var(env_keys::TIMEOUT_MS)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(network::TIMEOUT_API_REQUEST_MS)
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> NodeError {
    if err.is_timeout() {
        return NodeError::timeout("Telegram API request timed out");
    }
    NodeError::api(redact_token(&err.to_string()))
}

fn multipart_form(body: MultipartBody) -> Result<Form, NodeError> {
    let mut form = Form::new();
    for (name, value) in body.fields {
        form = form.text(name, value);
    }
    let file = body.file;
    let part = Part::bytes(file.bytes.to_vec())
        .file_name(file.file_name)
        .mime_str(&file.content_type)
        .map_err(|err| {
            NodeError::configuration(format!("Invalid MIME type '{}': {}", file.content_type, err))
        })?;
    Ok(form.part(file.field, part))
}

/// Bot API error for a non-2xx status or an `ok: false` envelope.
fn api_error(status: StatusCode, payload: &Value, raw: &str) -> NodeError {
    let mut err = NodeError::api(format!("Telegram API request failed ({})", status.as_u16()))
        .with_details(serde_json::json!({
            "status": status.as_u16(),
            "error_code": payload.get("error_code").cloned().unwrap_or(Value::Null),
            "body": redact_preview(raw, network::ERROR_PREVIEW_BYTES),
        }));
    if let Some(description) = payload.get("description").and_then(Value::as_str) {
        err = err.with_description(description);
    }
    err
}

#[async_trait]
impl TelegramTransport for HttpTransport {
    async fn call(&self, request: RequestSpec) -> Result<Value, NodeError> {
        let url = self.credentials.bot_url(&request.endpoint);
        let client = self.get_client()?;
        let mut builder = client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        let multipart = request.multipart.is_some();
        if let Some(body) = request.multipart {
            builder = builder.multipart(multipart_form(body)?);
        } else if !request.body.is_empty() {
            builder = builder.json(&request.body);
        }

        let started = Instant::now();
        self.logger.debug(
            "Calling Telegram API",
            Some(&serde_json::json!({
                "method": request.method.as_str(),
                "url": redact_token(&url),
                "multipart": multipart,
            })),
        );
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let raw = response.text().await.map_err(map_reqwest_error)?;
        let payload: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);

        let ok = payload.get("ok").and_then(Value::as_bool).unwrap_or(true);
        if !status.is_success() || !ok {
            let err = api_error(status, &payload, &raw);
            self.logger.warn(
                "Telegram API returned an error",
                Some(&serde_json::json!({
                    "endpoint": request.endpoint,
                    "status": status.as_u16(),
                    "description": err.description,
                })),
            );
            return Err(err);
        }
        if payload.is_null() && !raw.trim().is_empty() {
            return Err(NodeError::api("Telegram API returned a non-JSON response").with_details(
                serde_json::json!({ "body": redact_preview(&raw, network::ERROR_PREVIEW_BYTES) }),
            ));
        }

        self.logger.debug(
            "Telegram API call finished",
            Some(&serde_json::json!({
                "endpoint": request.endpoint,
                "status": status.as_u16(),
                "duration_ms": started.elapsed().as_millis() as u64,
            })),
        );
        Ok(payload)
    }

    async fn fetch_file(&self, file_path: &str) -> Result<Bytes, NodeError> {
        let url = self.credentials.file_url(file_path);
        self.logger.debug(
            "Downloading file",
            Some(&serde_json::json!({ "url": redact_token(&url) })),
        );
        let response = self
            .get_client()?
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let payload: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);
            return Err(api_error(status, &payload, &raw));
        }
        let mut stream = response.bytes_stream();
        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk.map_err(map_reqwest_error)?);
        }
        self.logger.debug(
            "File downloaded",
            Some(&serde_json::json!({ "bytes": buffer.len() })),
        );
        Ok(buffer.freeze())
    }
}
