//! rio-scale: scale and weight reconciliation for a service.
//!
//! Derives a "desired vs. actual" view of a service from its server-reported
//! status and any locally pending scale intent, and persists that intent to
//! the resource store through a trailing-edge debounced write.
//!
//! # Scale derivation
//!
//! ```text
//! fixed   = spec.replicas ?? 1
//! current = status.computedReplicas ?? scaleStatus.available
//! desired = autoscale ? (min, max) : fixed
//! desired = global ? current : pending ?? desired
//!
//! missing  = desired - available - unavailable
//! starting = max(0, missing)
//! stopping = max(0, -missing)
//! ```
//!
//! # Components
//!
//! - **`state`**: the `ResourceState` projection of a service
//! - **`summary`**: `compute_scale` and display predicates
//! - **`weights`**: `compute_weights`
//! - **`notify`**: user-facing failure notifications
//! - **`reconciler`**: scale intents, debounced writes, weight and pause writes

pub mod notify;
pub mod reconciler;
pub mod state;
pub mod summary;
pub mod weights;

pub use notify::{ChannelNotifier, LogNotifier, Notification, Notifier};
pub use reconciler::{DEFAULT_DEBOUNCE, ServiceReconciler};
pub use state::{AutoscaleBounds, ResourceState};
pub use summary::{Desired, ScalePart, ScalePartKind, ScaleSummary, compute_scale};
pub use weights::{Weights, compute_weights};
