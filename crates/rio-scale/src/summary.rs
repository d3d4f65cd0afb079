//! Derived scale summary.
//!
//! `compute_scale` is a pure function of the resource state and the pending
//! scale intent; calling it repeatedly with the same inputs yields the same
//! summary.

use std::fmt;

use serde::Serialize;

use crate::state::ResourceState;

/// Target instance count of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Desired {
    /// An exact replica count.
    Fixed(u32),
    /// Autoscaled between two bounds.
    Range { min: u32, max: u32 },
}

impl Desired {
    /// The exact count, if the target is not a range.
    pub fn as_fixed(self) -> Option<u32> {
        match self {
            Desired::Fixed(n) => Some(n),
            Desired::Range { .. } => None,
        }
    }
}

impl fmt::Display for Desired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Desired::Fixed(n) => write!(f, "{n}"),
            Desired::Range { min, max } => write!(f, "{min} - {max}"),
        }
    }
}

/// Desired vs. actual scale of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScaleSummary {
    pub global: bool,
    pub auto: bool,
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub current: u32,
    pub desired: Desired,
    pub available: u32,
    pub unavailable: u32,
    pub starting: u32,
    pub stopping: u32,
}

/// Compute the scale summary for `state` with an optional pending intent.
///
/// While the target is an autoscale range, `starting` and `stopping` are 0.
pub fn compute_scale(state: &ResourceState, pending: Option<u32>) -> ScaleSummary {
    let fixed = state.spec_replicas.unwrap_or(1);
    let available = state.status_available;
    let unavailable = state.status_unavailable;
    let current = state.status_computed_replicas.unwrap_or(available);

    let mut desired = match state.autoscale {
        Some(bounds) => Desired::Range {
            min: bounds.min,
            max: bounds.max,
        },
        None => Desired::Fixed(fixed),
    };

    if state.global {
        desired = Desired::Fixed(current);
    } else if let Some(pending) = pending {
        desired = Desired::Fixed(pending);
    }

    let (starting, stopping) = match desired {
        Desired::Fixed(target) => {
            let missing = i64::from(target) - i64::from(available) - i64::from(unavailable);
            (clamp_u32(missing), clamp_u32(-missing))
        }
        Desired::Range { .. } => (0, 0),
    };

    ScaleSummary {
        global: state.global,
        auto: state.autoscale.is_some(),
        min: state.autoscale.map(|b| b.min),
        max: state.autoscale.map(|b| b.max),
        current,
        desired,
        available,
        unavailable,
        starting,
        stopping,
    }
}

fn clamp_u32(n: i64) -> u32 {
    u32::try_from(n.max(0)).unwrap_or(u32::MAX)
}

impl ScaleSummary {
    /// Whether the display should show a target next to the current count.
    pub fn show_desired_scale(&self) -> bool {
        !self.global && Desired::Fixed(self.current) != self.desired
    }

    /// Whether the instance breakdown is worth showing.
    pub fn complex_scale(&self) -> bool {
        self.stopping != 0 || self.starting != 0 || self.unavailable != 0
    }

    /// Instance breakdown: available and unavailable always, starting and
    /// stopping only when nonzero.
    pub fn parts(&self) -> Vec<ScalePart> {
        let mut out = vec![
            ScalePart::new(ScalePartKind::Available, self.available),
            ScalePart::new(ScalePartKind::Unavailable, self.unavailable),
        ];
        if self.starting != 0 {
            out.push(ScalePart::new(ScalePartKind::Starting, self.starting));
        }
        if self.stopping != 0 {
            out.push(ScalePart::new(ScalePartKind::Stopping, self.stopping));
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalePartKind {
    Available,
    Unavailable,
    Starting,
    Stopping,
}

impl ScalePartKind {
    pub fn label(self) -> &'static str {
        match self {
            ScalePartKind::Available => "Available",
            ScalePartKind::Unavailable => "Unavailable",
            ScalePartKind::Starting => "Starting",
            ScalePartKind::Stopping => "Stopping",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScalePart {
    pub kind: ScalePartKind,
    pub label: &'static str,
    pub value: u32,
}

impl ScalePart {
    fn new(kind: ScalePartKind, value: u32) -> Self {
        Self {
            kind,
            label: kind.label(),
            value,
        }
    }
}
