use std::collections::BTreeMap;

use crate::actions::MonitorActions;
use crate::error::ActionError;
use crate::group::{count_by, group_by};
use crate::models::{
    ClosedEnum, CurrentUser, Severity, SyncError, UnlinkedDeepCuraNote, UnlinkedNoteStatus,
};
use crate::policy::{can_acknowledge, can_act_on, can_review, can_triage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorViewMode {
    #[default]
    Severity,
    Source,
}

#[derive(Debug, Clone)]
pub struct ErrorSection<'a> {
    pub title: &'static str,
    pub errors: Vec<&'a SyncError>,
}

#[derive(Debug, Clone)]
pub struct ErrorsProjection<'a> {
    pub unresolved_by_severity: BTreeMap<Severity, usize>,
    pub sections: Vec<ErrorSection<'a>>,
    pub expanded: Option<&'a SyncError>,
    pub pending_notes: Vec<&'a UnlinkedDeepCuraNote>,
    pub can_triage: bool,
}

/// Local state of the error triage screen.
#[derive(Debug, Clone, Default)]
pub struct ErrorsView {
    mode: ErrorViewMode,
    expanded_id: Option<String>,
}

impl ErrorsView {
    pub fn set_mode(&mut self, mode: ErrorViewMode) {
        self.mode = mode;
    }

    pub fn toggle(&mut self, id: &str) {
        if self.expanded_id.as_deref() == Some(id) {
            self.expanded_id = None;
        } else {
            self.expanded_id = Some(id.to_string());
        }
    }

    pub fn project<'a>(
        &self,
        errors: &'a [SyncError],
        notes: &'a [UnlinkedDeepCuraNote],
        user: &CurrentUser,
    ) -> ErrorsProjection<'a> {
        let unresolved: Vec<&'a SyncError> = errors
            .iter()
            .filter(|error| !error.status.is_terminal())
            .collect();

        let sections = match self.mode {
            ErrorViewMode::Severity => sections(&unresolved, |error| error.severity),
            ErrorViewMode::Source => sections(&unresolved, |error| error.source),
        };

        let expanded = self
            .expanded_id
            .as_deref()
            .and_then(|id| unresolved.iter().copied().find(|error| error.id == id));

        ErrorsProjection {
            unresolved_by_severity: count_by(&unresolved, |error| error.severity),
            sections,
            expanded,
            pending_notes: notes
                .iter()
                .filter(|note| note.status == UnlinkedNoteStatus::PendingReview)
                .collect(),
            can_triage: can_triage(user.role),
        }
    }

    pub fn acknowledge(
        &self,
        errors: &[SyncError],
        id: &str,
        user: &CurrentUser,
        actions: &mut dyn MonitorActions,
    ) -> Result<(), ActionError> {
        let error = find_error(errors, id)?;
        if !can_acknowledge(user.role, error) {
            return Err(refusal(user, error, "acknowledge errors"));
        }
        actions.acknowledge_error(id);
        Ok(())
    }

    pub fn retry(
        &self,
        errors: &[SyncError],
        id: &str,
        user: &CurrentUser,
        actions: &mut dyn MonitorActions,
    ) -> Result<(), ActionError> {
        let error = find_error(errors, id)?;
        if !can_act_on(user.role, error) {
            return Err(refusal(user, error, "retry errors"));
        }
        actions.retry_error(id);
        Ok(())
    }

    pub fn assign(
        &self,
        errors: &[SyncError],
        id: &str,
        assignee: &str,
        user: &CurrentUser,
        actions: &mut dyn MonitorActions,
    ) -> Result<(), ActionError> {
        let error = find_error(errors, id)?;
        if !can_act_on(user.role, error) {
            return Err(refusal(user, error, "assign errors"));
        }
        actions.assign_error(id, assignee);
        Ok(())
    }

    pub fn add_note(
        &self,
        errors: &[SyncError],
        id: &str,
        note: &str,
        user: &CurrentUser,
        actions: &mut dyn MonitorActions,
    ) -> Result<(), ActionError> {
        let error = find_error(errors, id)?;
        if !can_act_on(user.role, error) {
            return Err(refusal(user, error, "add notes"));
        }
        actions.add_error_note(id, note);
        Ok(())
    }

    pub fn resolve(
        &self,
        errors: &[SyncError],
        id: &str,
        user: &CurrentUser,
        actions: &mut dyn MonitorActions,
    ) -> Result<(), ActionError> {
        let error = find_error(errors, id)?;
        if !can_act_on(user.role, error) {
            return Err(refusal(user, error, "resolve errors"));
        }
        actions.resolve_error(id);
        Ok(())
    }

    pub fn link_note(
        &self,
        notes: &[UnlinkedDeepCuraNote],
        note_id: &str,
        clinical_note_id: &str,
        user: &CurrentUser,
        actions: &mut dyn MonitorActions,
    ) -> Result<(), ActionError> {
        let note = find_note(notes, note_id)?;
        review_allowed(note, user, "link notes")?;
        actions.link_deep_cura_note(note_id, clinical_note_id);
        Ok(())
    }

    pub fn dismiss_note(
        &self,
        notes: &[UnlinkedDeepCuraNote],
        note_id: &str,
        reason: &str,
        user: &CurrentUser,
        actions: &mut dyn MonitorActions,
    ) -> Result<(), ActionError> {
        let note = find_note(notes, note_id)?;
        review_allowed(note, user, "dismiss notes")?;
        actions.dismiss_deep_cura_note(note_id, reason);
        Ok(())
    }
}

fn sections<'a, K, F>(errors: &[&'a SyncError], key: F) -> Vec<ErrorSection<'a>>
where
    K: ClosedEnum,
    F: Fn(&SyncError) -> K,
{
    group_by(errors, |error| key(*error))
        .into_iter()
        .map(|(value, members)| ErrorSection {
            title: value.label(),
            errors: members.into_iter().copied().collect(),
        })
        .collect()
}

fn find_error<'a>(errors: &'a [SyncError], id: &str) -> Result<&'a SyncError, ActionError> {
    errors
        .iter()
        .find(|error| error.id == id)
        .ok_or_else(|| ActionError::UnknownRecord {
            kind: "error",
            id: id.to_string(),
        })
}

fn find_note<'a>(
    notes: &'a [UnlinkedDeepCuraNote],
    id: &str,
) -> Result<&'a UnlinkedDeepCuraNote, ActionError> {
    notes
        .iter()
        .find(|note| note.id == id)
        .ok_or_else(|| ActionError::UnknownRecord {
            kind: "unlinked note",
            id: id.to_string(),
        })
}

fn refusal(user: &CurrentUser, error: &SyncError, action: &'static str) -> ActionError {
    if can_triage(user.role) {
        ActionError::InvalidState {
            id: error.id.clone(),
            action,
            status: error.status.label(),
        }
    } else {
        ActionError::NotPermitted {
            role: user.role.label(),
            action,
        }
    }
}

fn review_allowed(
    note: &UnlinkedDeepCuraNote,
    user: &CurrentUser,
    action: &'static str,
) -> Result<(), ActionError> {
    if can_review(user.role, note) {
        return Ok(());
    }
    if can_triage(user.role) {
        return Err(ActionError::InvalidState {
            id: note.id.clone(),
            action,
            status: note.status.label(),
        });
    }
    Err(ActionError::NotPermitted {
        role: user.role.label(),
        action,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests::RecordingActions;
    use crate::fixtures::sample_snapshot;
    use crate::models::{StaffRoleType, SyncSource};

    fn user(role: StaffRoleType) -> CurrentUser {
        CurrentUser {
            email: "someone@feelaugust.com".to_string(),
            name: "Someone".to_string(),
            role,
        }
    }

    #[test]
    fn severity_sections_cover_unresolved_errors() {
        let snapshot = sample_snapshot().unwrap();
        let view = ErrorsView::default();
        let projection = view.project(
            &snapshot.sync_errors,
            &snapshot.unlinked_deep_cura_notes,
            &user(StaffRoleType::Operator),
        );

        let titles: Vec<&str> = projection.sections.iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Critical", "High", "Medium", "Low"]);

        let listed: usize = projection.sections.iter().map(|s| s.errors.len()).sum();
        assert_eq!(listed, 5);
        assert!(projection.sections[3].errors.is_empty());
        assert_eq!(projection.unresolved_by_severity[&Severity::Critical], 2);
        assert_eq!(projection.pending_notes.len(), 2);
        assert!(projection.can_triage);
    }

    #[test]
    fn source_mode_keeps_empty_sources() {
        let mut snapshot = sample_snapshot().unwrap();
        snapshot
            .sync_errors
            .retain(|error| error.source != SyncSource::Coda);

        let mut view = ErrorsView::default();
        view.set_mode(ErrorViewMode::Source);
        let projection = view.project(
            &snapshot.sync_errors,
            &snapshot.unlinked_deep_cura_notes,
            &user(StaffRoleType::Viewer),
        );

        assert_eq!(projection.sections.len(), 3);
        assert_eq!(projection.sections[2].title, SyncSource::Coda.label());
        assert!(projection.sections[2].errors.is_empty());
        assert!(!projection.can_triage);
    }

    #[test]
    fn acknowledge_requires_open_error_and_triage_role() {
        let snapshot = sample_snapshot().unwrap();
        let view = ErrorsView::default();
        let mut actions = RecordingActions::default();
        let operator = user(StaffRoleType::Operator);

        view.acknowledge(&snapshot.sync_errors, "err-501", &operator, &mut actions)
            .unwrap();
        assert_eq!(actions.calls, vec!["ack:err-501"]);

        let err = view
            .acknowledge(&snapshot.sync_errors, "err-502", &operator, &mut actions)
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidState { .. }));

        let err = view
            .acknowledge(&snapshot.sync_errors, "err-501", &user(StaffRoleType::Viewer), &mut actions)
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::NotPermitted {
                role: "viewer",
                action: "acknowledge errors"
            }
        );
        assert_eq!(actions.calls.len(), 1);
    }

    #[test]
    fn resolved_errors_accept_no_further_actions() {
        let snapshot = sample_snapshot().unwrap();
        let view = ErrorsView::default();
        let mut actions = RecordingActions::default();
        let admin = user(StaffRoleType::Admin);

        assert!(view
            .retry(&snapshot.sync_errors, "err-505", &admin, &mut actions)
            .is_err());
        view.retry(&snapshot.sync_errors, "err-502", &admin, &mut actions)
            .unwrap();
        view.resolve(&snapshot.sync_errors, "err-502", &admin, &mut actions)
            .unwrap();
        assert_eq!(actions.calls, vec!["retry:err-502", "resolve:err-502"]);

        let err = view
            .resolve(&snapshot.sync_errors, "err-999", &admin, &mut actions)
            .unwrap_err();
        assert!(matches!(err, ActionError::UnknownRecord { .. }));
    }

    #[test]
    fn only_pending_notes_can_be_linked() {
        let snapshot = sample_snapshot().unwrap();
        let view = ErrorsView::default();
        let mut actions = RecordingActions::default();
        let operator = user(StaffRoleType::Operator);
        let notes = &snapshot.unlinked_deep_cura_notes;

        view.link_note(notes, "dc-7790", "cn-4480", &operator, &mut actions)
            .unwrap();
        assert!(view
            .link_note(notes, "dc-7702", "cn-4302", &operator, &mut actions)
            .is_err());
        assert!(view
            .dismiss_note(notes, "dc-7795", "duplicate", &user(StaffRoleType::Viewer), &mut actions)
            .is_err());
        assert_eq!(actions.calls, vec!["link:dc-7790->cn-4480"]);
    }

    #[test]
    fn expanded_error_toggles() {
        let snapshot = sample_snapshot().unwrap();
        let mut view = ErrorsView::default();
        let operator = user(StaffRoleType::Operator);

        view.toggle("err-503");
        let projection = view.project(&snapshot.sync_errors, &[], &operator);
        assert_eq!(projection.expanded.map(|e| e.id.as_str()), Some("err-503"));

        view.toggle("err-503");
        let projection = view.project(&snapshot.sync_errors, &[], &operator);
        assert!(projection.expanded.is_none());
    }
}
