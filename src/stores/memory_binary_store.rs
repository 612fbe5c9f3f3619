use crate::errors::NodeError;
use crate::services::binary_store::BinaryStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Clone, Default)]
pub struct MemoryBinaryStore {
    entries: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryBinaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bytes` under a fresh id and returns it.
    pub fn put(&self, bytes: impl Into<Bytes>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.insert(&id, bytes);
        id
    }

    pub fn insert(&self, id: &str, bytes: impl Into<Bytes>) {
        if let Ok(mut guard) = self.entries.write() {
            guard.insert(id.to_string(), bytes.into());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BinaryStore for MemoryBinaryStore {
    async fn read(&self, id: &str) -> Result<Bytes, NodeError> {
        let guard = self
            .entries
            .read()
            .map_err(|_| NodeError::internal("Binary store lock poisoned"))?;
        guard.get(id).cloned().ok_or_else(|| {
            NodeError::configuration(format!("Binary data '{}' was not found in the store", id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::binary_store::load_binary;
    use crate::services::items::BinaryData;

    #[tokio::test]
    async fn load_binary_prefers_store_for_ids() {
        let store = MemoryBinaryStore::new();
        let id = store.put(&b"stored"[..]);
        let stored = BinaryData::stored(&id, Some("a.bin"), "application/octet-stream");
        assert_eq!(load_binary(&store, &stored).await.unwrap(), &b"stored"[..]);

        let inline = BinaryData::inline(b"inline", Some("b.txt"), "text/plain");
        assert_eq!(load_binary(&store, &inline).await.unwrap(), &b"inline"[..]);
    }

    #[tokio::test]
    async fn missing_id_is_reported() {
        let store = MemoryBinaryStore::new();
        let missing = BinaryData::stored("nope", None, "image/png");
        assert!(load_binary(&store, &missing).await.is_err());
    }
}
