//! Scale-relevant projection of a service resource.

use rio_core::ServiceResource;

/// Autoscaling bounds of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoscaleBounds {
    pub min: u32,
    pub max: u32,
}

/// The fields of a service that scale and weight derivations read.
///
/// Read-only from the reconciler's point of view; replaced wholesale when
/// the store delivers a fresh copy of the resource.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResourceState {
    /// Declared replica count. Absent means 1.
    pub spec_replicas: Option<u32>,
    pub autoscale: Option<AutoscaleBounds>,
    /// One instance per node; desired always equals current.
    pub global: bool,
    pub status_available: u32,
    pub status_unavailable: u32,
    /// Falls back to `status_available` when absent.
    pub status_computed_replicas: Option<u32>,
    pub spec_weight: Option<f64>,
    pub status_computed_weight: Option<f64>,
    /// Whether the resource carries a status object at all.
    pub has_status: bool,
}

impl From<&ServiceResource> for ResourceState {
    fn from(service: &ServiceResource) -> Self {
        let status = service.status.as_ref();
        let scale_status = status.and_then(|s| s.scale_status).unwrap_or_default();

        Self {
            spec_replicas: service.spec.replicas,
            autoscale: service.spec.autoscale.map(|a| AutoscaleBounds {
                min: a.min_replicas,
                max: a.max_replicas,
            }),
            global: service.spec.global,
            status_available: scale_status.available,
            status_unavailable: scale_status.unavailable,
            status_computed_replicas: status.and_then(|s| s.computed_replicas),
            spec_weight: service.spec.weight,
            status_computed_weight: status.and_then(|s| s.computed_weight),
            has_status: status.is_some(),
        }
    }
}
