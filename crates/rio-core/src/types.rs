//! Domain types for the service resource.
//!
//! These mirror the JSON shape the resource API serves for a service:
//! `metadata`, `spec`, an optional `status`, and `links`. Every field the
//! API may omit is an `Option` or carries a serde default, so partially
//! populated resources deserialize cleanly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a service (`{namespace}/{name}`).
pub type ServiceId = String;

/// Link name that grants update permission on a resource.
pub const UPDATE_LINK: &str = "update";

// ── Service ────────────────────────────────────────────────────────

/// A deployable service as returned by the resource API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResource {
    pub id: ServiceId,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ServiceSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ServiceStatus>,
    /// Action links keyed by name (`update`, `remove`, ...).
    #[serde(default)]
    pub links: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// RFC 3339 creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
}

/// User-declared service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Container image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Source build; present while the image is built from git.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildSpec>,
    /// Fixed replica count. Absent means 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale: Option<AutoscaleSpec>,
    /// One instance per node; not count-scalable.
    #[serde(default)]
    pub global: bool,
    /// Declared traffic weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollout: Option<RolloutSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Autoscaling bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AutoscaleSpec {
    #[serde(default)]
    pub min_replicas: u32,
    #[serde(default)]
    pub max_replicas: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RolloutSpec {
    #[serde(default)]
    pub pause: bool,
}

// ── Status ────────────────────────────────────────────────────────

/// Server-observed service state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_version: Option<String>,
    /// Server's view of the current replica count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_replicas: Option<u32>,
    /// Server-observed traffic weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_status: Option<ScaleStatus>,
}

/// Instance readiness counts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScaleStatus {
    #[serde(default)]
    pub available: u32,
    #[serde(default)]
    pub unavailable: u32,
}

impl ServiceResource {
    /// Whether the resource carries an `update` link.
    pub fn can_update(&self) -> bool {
        self.links.contains_key(UPDATE_LINK)
    }

    /// Whether the current rollout is paused.
    pub fn is_paused(&self) -> bool {
        self.spec.rollout.as_ref().is_some_and(|r| r.pause)
    }

    /// Composite key: `{namespace}/{name}`.
    pub fn table_key(&self) -> String {
        match (&self.metadata.namespace, &self.metadata.name) {
            (Some(ns), Some(name)) => format!("{ns}/{name}"),
            _ => self.id.clone(),
        }
    }
}
