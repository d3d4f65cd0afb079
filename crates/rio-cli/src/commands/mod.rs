pub mod show;
pub mod update;

use std::path::Path;

use rio_core::ServiceResource;
use rio_store::{FileStore, fetch_service};

/// Open the file store and load one service from it.
pub async fn load(store_path: &Path, id: &str) -> anyhow::Result<(FileStore, ServiceResource)> {
    let store = FileStore::open(store_path).await?;
    let service = fetch_service(&store, id).await?;
    Ok((store, service))
}
