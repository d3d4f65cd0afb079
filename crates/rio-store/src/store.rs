//! The `ResourceStore` trait.
//!
//! Stores hand out JSON documents by id and accept patch lists against
//! them. Futures are boxed so a store can be used as `dyn ResourceStore`
//! and injected into the reconciler for testing.

use std::future::Future;
use std::pin::Pin;

use rio_core::ServiceResource;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::patch::PatchOp;

/// Boxed future alias for store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// A keyed collection of resource documents.
pub trait ResourceStore: Send + Sync {
    /// Fetch the current document for `id`.
    fn get<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Value>;

    /// Apply `ops` to the document for `id`, all or nothing.
    fn patch<'a>(&'a self, id: &'a str, ops: Vec<PatchOp>) -> StoreFuture<'a, ()>;

    /// Insert or overwrite the document for `id`.
    fn put<'a>(&'a self, id: &'a str, doc: Value) -> StoreFuture<'a, ()>;

    /// List stored ids in sorted order.
    fn list(&self) -> StoreFuture<'_, Vec<String>>;
}

/// Fetch and decode a service resource.
pub async fn fetch_service<S>(store: &S, id: &str) -> StoreResult<ServiceResource>
where
    S: ResourceStore + ?Sized,
{
    let doc = store.get(id).await?;
    serde_json::from_value(doc).map_err(|e| StoreError::Deserialize(e.to_string()))
}
