//! rio-store: resource store collaborators for the rio console.
//!
//! Resources are held as JSON documents keyed by id and mutated through
//! JSON-Patch style operation lists, the same way the resource API accepts
//! partial updates.
//!
//! # Components
//!
//! - **`patch`**: patch operations and their application to a document
//! - **`store`**: the `ResourceStore` trait
//! - **`memory`**: in-process store (tests, embedding)
//! - **`file`**: JSON-file store used by `rioctl`

pub mod error;
pub mod file;
pub mod memory;
pub mod patch;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use patch::{PatchKind, PatchOp, apply_patch};
pub use store::{ResourceStore, StoreFuture, fetch_service};
