use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::actions::MonitorActions;
use crate::error::ActionError;
use crate::format::format_elapsed;
use crate::models::{ClosedEnum, CurrentUser, RunningSyncOperation, SyncAction};
use crate::policy::can_trigger;

#[derive(Debug, Clone)]
pub struct RunningCard<'a> {
    pub operation: &'a RunningSyncOperation,
    pub started: String,
}

#[derive(Debug, Clone)]
pub struct ActionCard<'a> {
    pub action: &'a SyncAction,
    pub permitted: bool,
    pub running: bool,
}

impl ActionCard<'_> {
    pub fn disabled(&self) -> bool {
        !self.permitted || self.running
    }
}

#[derive(Debug, Clone)]
pub struct ActionsProjection<'a> {
    pub running: Vec<RunningCard<'a>>,
    pub actions: Vec<ActionCard<'a>>,
    pub confirming: Option<&'a SyncAction>,
}

/// Manual sync triggers. Triggering is two-step: request, then confirm.
#[derive(Debug, Clone, Default)]
pub struct ActionsView {
    confirming: Option<String>,
}

impl ActionsView {
    pub fn project<'a>(
        &self,
        actions: &'a [SyncAction],
        running: &'a [RunningSyncOperation],
        user: &CurrentUser,
        now: DateTime<Utc>,
    ) -> ActionsProjection<'a> {
        let running_ids: HashSet<&str> = running.iter().map(|op| op.action_id.as_str()).collect();

        ActionsProjection {
            running: running
                .iter()
                .map(|operation| RunningCard {
                    operation,
                    started: format_elapsed(operation.started_at, now, "Just started"),
                })
                .collect(),
            actions: actions
                .iter()
                .map(|action| ActionCard {
                    action,
                    permitted: can_trigger(user.role, action.required_role),
                    running: running_ids.contains(action.id.as_str()),
                })
                .collect(),
            confirming: self
                .confirming
                .as_deref()
                .and_then(|id| actions.iter().find(|action| action.id == id)),
        }
    }

    /// Opens the confirmation step for `action_id` and returns the action so
    /// the caller can show its confirmation message.
    pub fn request<'a>(
        &mut self,
        actions: &'a [SyncAction],
        running: &[RunningSyncOperation],
        action_id: &str,
        user: &CurrentUser,
    ) -> Result<&'a SyncAction, ActionError> {
        let action = actions
            .iter()
            .find(|action| action.id == action_id)
            .ok_or_else(|| ActionError::UnknownRecord {
                kind: "sync action",
                id: action_id.to_string(),
            })?;

        if !can_trigger(user.role, action.required_role) {
            return Err(ActionError::NotPermitted {
                role: user.role.label(),
                action: "trigger this action",
            });
        }
        if running.iter().any(|op| op.action_id == action.id) {
            return Err(ActionError::AlreadyRunning(action.id.clone()));
        }

        self.confirming = Some(action.id.clone());
        Ok(action)
    }

    pub fn confirm(&mut self, actions: &mut dyn MonitorActions) -> Result<String, ActionError> {
        let action_id = self.confirming.take().ok_or(ActionError::NothingToConfirm)?;
        actions.trigger_sync_action(&action_id);
        Ok(action_id)
    }

    pub fn cancel(&mut self) {
        self.confirming = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests::RecordingActions;
    use crate::fixtures::sample_snapshot;
    use crate::models::StaffRoleType;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 15, 0, 0).unwrap()
    }

    fn user(role: StaffRoleType) -> CurrentUser {
        CurrentUser {
            email: "someone@feelaugust.com".to_string(),
            name: "Someone".to_string(),
            role,
        }
    }

    #[test]
    fn cards_reflect_role_and_running_operations() {
        let snapshot = sample_snapshot().unwrap();
        let view = ActionsView::default();
        let projection = view.project(
            &snapshot.sync_actions,
            &snapshot.running_sync_operations,
            &user(StaffRoleType::Operator),
            now(),
        );

        let card = |id: &str| {
            projection
                .actions
                .iter()
                .find(|card| card.action.id == id)
                .unwrap()
        };
        assert!(!card("action-full-reconciliation").permitted);
        assert!(card("action-drchrono-patients").running);
        assert!(card("action-drchrono-patients").disabled());
        assert!(!card("action-deepcura-relink").disabled());

        assert_eq!(projection.running[0].started, "2m ago");
        assert_eq!(projection.running[1].started, "Just started");
    }

    #[test]
    fn trigger_fires_only_after_confirmation() {
        let snapshot = sample_snapshot().unwrap();
        let mut view = ActionsView::default();
        let mut actions = RecordingActions::default();
        let operator = user(StaffRoleType::Operator);

        let action = view
            .request(
                &snapshot.sync_actions,
                &snapshot.running_sync_operations,
                "action-deepcura-relink",
                &operator,
            )
            .unwrap();
        assert!(action.confirmation_message.contains("Deep Cura"));
        assert!(actions.calls.is_empty());

        assert_eq!(view.confirm(&mut actions).unwrap(), "action-deepcura-relink");
        assert_eq!(actions.calls, vec!["trigger:action-deepcura-relink"]);
        assert_eq!(view.confirm(&mut actions), Err(ActionError::NothingToConfirm));
    }

    #[test]
    fn cancel_discards_pending_trigger() {
        let snapshot = sample_snapshot().unwrap();
        let mut view = ActionsView::default();
        let mut actions = RecordingActions::default();

        view.request(
            &snapshot.sync_actions,
            &snapshot.running_sync_operations,
            "action-health-check",
            &user(StaffRoleType::Admin),
        )
        .unwrap();
        view.cancel();
        assert!(view.confirm(&mut actions).is_err());
        assert!(actions.calls.is_empty());
    }

    #[test]
    fn refuses_ineligible_or_busy_actions() {
        let snapshot = sample_snapshot().unwrap();
        let mut view = ActionsView::default();
        let request = |view: &mut ActionsView, id: &str, role| {
            view.request(
                &snapshot.sync_actions,
                &snapshot.running_sync_operations,
                id,
                &user(role),
            )
            .map(|action| action.id.clone())
        };

        assert!(matches!(
            request(&mut view, "action-full-reconciliation", StaffRoleType::Operator),
            Err(ActionError::NotPermitted { .. })
        ));
        assert!(matches!(
            request(&mut view, "action-health-check", StaffRoleType::Viewer),
            Err(ActionError::NotPermitted { .. })
        ));
        assert_eq!(
            request(&mut view, "action-coda-push", StaffRoleType::Admin),
            Err(ActionError::AlreadyRunning("action-coda-push".to_string()))
        );
        assert!(matches!(
            request(&mut view, "action-missing", StaffRoleType::Admin),
            Err(ActionError::UnknownRecord { .. })
        ));
    }
}
