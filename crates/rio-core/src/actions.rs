//! Service-specific actions offered by the console.

use serde::Serialize;

use crate::types::ServiceResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    GoToStage,
    AddSidecar,
    Resume,
    Pause,
}

impl ActionKind {
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::GoToStage => "Stage New Version",
            ActionKind::AddSidecar => "Add a Sidecar",
            ActionKind::Resume => "Resume Rollout",
            ActionKind::Pause => "Pause Rollout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceAction {
    pub action: ActionKind,
    pub label: &'static str,
    pub enabled: bool,
}

impl ServiceAction {
    fn new(action: ActionKind, enabled: bool) -> Self {
        Self {
            action,
            label: action.label(),
            enabled,
        }
    }
}

/// Actions for a service, in menu order.
///
/// Every action requires the `update` link. Pause and resume are mutually
/// exclusive on the rollout's pause flag.
pub fn available_actions(service: &ServiceResource) -> Vec<ServiceAction> {
    let can_update = service.can_update();
    let paused = service.is_paused();

    vec![
        ServiceAction::new(ActionKind::GoToStage, can_update),
        ServiceAction::new(ActionKind::AddSidecar, can_update),
        ServiceAction::new(ActionKind::Resume, can_update && paused),
        ServiceAction::new(ActionKind::Pause, can_update && !paused),
    ]
}
