use crate::constants::env as env_keys;
use crate::errors::NodeError;
use crate::services::binary_store::BinaryStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};

/// Binary store backed by a directory; ids are relative file paths under it.
#[derive(Clone, Debug)]
pub struct FileBinaryStore {
    root: PathBuf,
}

impl FileBinaryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var(env_keys::BINARY_DATA_DIR)
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(Self::new)
    }

    fn resolve(&self, id: &str) -> Result<PathBuf, NodeError> {
        let rel = Path::new(id);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if id.trim().is_empty() || escapes {
            return Err(NodeError::configuration(format!(
                "Binary data id '{}' must be a relative path inside the store",
                id
            )));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl BinaryStore for FileBinaryStore {
    async fn read(&self, id: &str) -> Result<Bytes, NodeError> {
        let path = self.resolve(id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(NodeError::configuration(format!(
                    "Binary data '{}' was not found in the store",
                    id
                )))
            }
            Err(err) => Err(NodeError::internal(format!(
                "Failed to read binary data '{}': {}",
                id, err
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_files_under_root() {
        let root = std::env::temp_dir().join(format!("telegram-bin-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(root.join("exec")).await.unwrap();
        tokio::fs::write(root.join("exec/photo.jpg"), b"jpeg").await.unwrap();

        let store = FileBinaryStore::new(&root);
        assert_eq!(store.read("exec/photo.jpg").await.unwrap(), &b"jpeg"[..]);
        assert!(store.read("exec/missing.jpg").await.is_err());

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn rejects_escaping_ids() {
        let store = FileBinaryStore::new("/tmp");
        assert!(store.read("../etc/passwd").await.is_err());
        assert!(store.read("/etc/passwd").await.is_err());
    }
}
