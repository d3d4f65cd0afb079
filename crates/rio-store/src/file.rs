//! JSON-file resource store.
//!
//! The whole store is one JSON object mapping id → resource document. It is
//! loaded on open and rewritten after every successful mutation (written to
//! a sibling temp file, then renamed over the original).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::patch::{PatchOp, apply_patch};
use crate::store::{ResourceStore, StoreFuture};

pub struct FileStore {
    path: PathBuf,
    docs: Mutex<BTreeMap<String, Value>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file starts an empty store.
    pub async fn open(path: &Path) -> StoreResult<Self> {
        let docs = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Deserialize(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::Read(e.to_string())),
        };
        debug!(?path, "file store opened");
        Ok(Self {
            path: path.to_path_buf(),
            docs: Mutex::new(docs),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, docs: &BTreeMap<String, Value>) -> StoreResult<()> {
        let bytes =
            serde_json::to_vec_pretty(docs).map_err(|e| StoreError::Serialize(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }
}

impl ResourceStore for FileStore {
    fn get<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Value> {
        Box::pin(async move {
            self.docs
                .lock()
                .await
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        })
    }

    fn patch<'a>(&'a self, id: &'a str, ops: Vec<PatchOp>) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut docs = self.docs.lock().await;
            let current = docs
                .get(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            let patched = apply_patch(current, &ops)?;

            let mut next = docs.clone();
            next.insert(id.to_string(), patched);
            self.persist(&next).await?;
            *docs = next;

            debug!(%id, ops = ops.len(), path = ?self.path, "resource patched");
            Ok(())
        })
    }

    fn put<'a>(&'a self, id: &'a str, doc: Value) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut docs = self.docs.lock().await;
            let mut next = docs.clone();
            next.insert(id.to_string(), doc);
            self.persist(&next).await?;
            *docs = next;
            Ok(())
        })
    }

    fn list(&self) -> StoreFuture<'_, Vec<String>> {
        Box::pin(async move { Ok(self.docs.lock().await.keys().cloned().collect()) })
    }
}
