//! rio-core: shared types for the rio console.
//!
//! - **`types`**: the service resource as stored and served by the API
//! - **`actions`**: rollout and staging actions offered per service
//! - **`display`**: derived naming and image display fields
//! - **`schema`**: schema index fields for the client-side store
//! - **`config`**: `console.toml` parser

pub mod actions;
pub mod config;
pub mod display;
pub mod schema;
pub mod types;

pub use actions::{ActionKind, ServiceAction, available_actions};
pub use config::ConsoleConfig;
pub use schema::Schema;
pub use types::*;
