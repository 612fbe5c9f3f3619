#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use telegram_node::errors::NodeError;
use telegram_node::managers::telegram::context::NodeContext;
use telegram_node::managers::telegram::request::RequestSpec;
use telegram_node::managers::telegram::{ExecutionOutcome, TelegramNode};
use telegram_node::services::items::{Item, OutputItem};
use telegram_node::services::logger::Logger;
use telegram_node::services::parameters::NodeParameters;
use telegram_node::services::transport::TelegramTransport;
use telegram_node::stores::memory_binary_store::MemoryBinaryStore;

pub static ENV_LOCK: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// Transport double: records every request and replays queued responses.
/// With an empty queue it answers `{"ok": true, "result": true}`.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<RequestSpec>>,
    responses: Mutex<VecDeque<Result<Value, NodeError>>>,
    files: Mutex<HashMap<String, Bytes>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, response: Result<Value, NodeError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn serve_file(&self, path: &str, bytes: &'static [u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), Bytes::from_static(bytes));
    }

    pub fn requests(&self) -> Vec<RequestSpec> {
        self.requests.lock().unwrap().clone()
    }

    pub fn single_request(&self) -> RequestSpec {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }
}

#[async_trait]
impl TelegramTransport for RecordingTransport {
    async fn call(&self, request: RequestSpec) -> Result<Value, NodeError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(serde_json::json!({ "ok": true, "result": true })))
    }

    async fn fetch_file(&self, file_path: &str) -> Result<Bytes, NodeError> {
        self.files
            .lock()
            .unwrap()
            .get(file_path)
            .cloned()
            .ok_or_else(|| NodeError::api(format!("no file at {}", file_path)))
    }
}

pub struct Harness {
    pub transport: Arc<RecordingTransport>,
    pub store: MemoryBinaryStore,
    pub node: TelegramNode,
}

pub fn harness() -> Harness {
    let transport = RecordingTransport::new();
    let store = MemoryBinaryStore::new();
    let node = TelegramNode::new(
        Logger::new("test"),
        transport.clone(),
        Arc::new(store.clone()),
    );
    Harness {
        transport,
        store,
        node,
    }
}

/// Context without attribution, so message texts stay as written.
pub fn plain_context() -> NodeContext {
    NodeContext::default().with_attribution_allowed(false)
}

pub fn items(count: usize) -> Vec<Item> {
    (0..count)
        .map(|index| Item::new(serde_json::json!({ "index": index })))
        .collect()
}

pub async fn run(harness: &Harness, params: Value, context: &NodeContext) -> Vec<OutputItem> {
    run_items(harness, &items(1), NodeParameters::new(params), context).await
}

pub async fn run_items(
    harness: &Harness,
    input: &[Item],
    params: NodeParameters,
    context: &NodeContext,
) -> Vec<OutputItem> {
    match harness
        .node
        .execute(input, &params, context)
        .await
        .expect("execution succeeds")
    {
        ExecutionOutcome::Completed { items } => items,
        other => panic!("unexpected outcome: {:?}", other),
    }
}

pub fn body_keys(body: &Map<String, Value>) -> Vec<&str> {
    body.keys().map(String::as_str).collect()
}
