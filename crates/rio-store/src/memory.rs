//! In-process resource store.
//!
//! `MemoryStore` is `Clone` + `Send` + `Sync` (backed by `Arc<RwLock<_>>`)
//! and can be shared across async tasks.

use std::collections::BTreeMap;
use std::sync::Arc;

use rio_core::ServiceResource;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::patch::{PatchOp, apply_patch};
use crate::store::{ResourceStore, StoreFuture};

#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a typed service under its id.
    pub async fn put_service(&self, service: &ServiceResource) -> StoreResult<()> {
        let doc =
            serde_json::to_value(service).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.docs.write().await.insert(service.id.clone(), doc);
        Ok(())
    }
}

impl ResourceStore for MemoryStore {
    fn get<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Value> {
        Box::pin(async move {
            self.docs
                .read()
                .await
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        })
    }

    fn patch<'a>(&'a self, id: &'a str, ops: Vec<PatchOp>) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut docs = self.docs.write().await;
            let doc = docs
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            *doc = apply_patch(doc, &ops)?;
            debug!(%id, ops = ops.len(), "resource patched");
            Ok(())
        })
    }

    fn put<'a>(&'a self, id: &'a str, doc: Value) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.docs.write().await.insert(id.to_string(), doc);
            Ok(())
        })
    }

    fn list(&self) -> StoreFuture<'_, Vec<String>> {
        Box::pin(async move { Ok(self.docs.read().await.keys().cloned().collect()) })
    }
}
