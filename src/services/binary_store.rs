use crate::errors::NodeError;
use crate::services::items::BinaryData;
use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;

/// Host binary storage: attachments that carry an `id` instead of inline data
/// are read through here.
#[async_trait]
pub trait BinaryStore: Send + Sync {
    async fn read(&self, id: &str) -> Result<Bytes, NodeError>;
}

/// Raw bytes of an attachment, from the store when it has an id, otherwise
/// decoded from the inline base64 payload.
pub async fn load_binary(store: &dyn BinaryStore, binary: &BinaryData) -> Result<Bytes, NodeError> {
    if let Some(id) = binary.id.as_deref().filter(|id| !id.is_empty()) {
        return store.read(id).await;
    }
    base64::engine::general_purpose::STANDARD
        .decode(binary.data.trim().as_bytes())
        .map(Bytes::from)
        .map_err(|err| {
            NodeError::configuration(format!("Binary data is not valid base64: {}", err))
        })
}
