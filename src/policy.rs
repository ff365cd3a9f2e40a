use crate::models::{ErrorStatus, StaffRoleType, SyncError, UnlinkedDeepCuraNote, UnlinkedNoteStatus};

/// Whether `user_role` may start an action gated on `required_role`.
///
/// Admins may trigger anything, operators anything not reserved for admins,
/// viewers nothing. Advisory only; the sync service enforces its own rules.
pub fn can_trigger(user_role: StaffRoleType, required_role: StaffRoleType) -> bool {
    match user_role {
        StaffRoleType::Admin => true,
        StaffRoleType::Operator => required_role != StaffRoleType::Admin,
        StaffRoleType::Viewer => false,
    }
}

/// Least privileged role that can actually trigger an action gated on
/// `required_role`. Viewers never trigger, so viewer-level actions need an operator.
pub fn lowest_trigger_role(required_role: StaffRoleType) -> StaffRoleType {
    match required_role {
        StaffRoleType::Admin => StaffRoleType::Admin,
        StaffRoleType::Operator | StaffRoleType::Viewer => StaffRoleType::Operator,
    }
}

/// Triage buttons (acknowledge, retry, assign, note, resolve) are shown to
/// admins and operators.
pub fn can_triage(user_role: StaffRoleType) -> bool {
    matches!(user_role, StaffRoleType::Admin | StaffRoleType::Operator)
}

pub fn can_acknowledge(user_role: StaffRoleType, error: &SyncError) -> bool {
    can_triage(user_role) && error.status == ErrorStatus::Open
}

/// Retry, assign, note and resolve stay available until the error is resolved.
pub fn can_act_on(user_role: StaffRoleType, error: &SyncError) -> bool {
    can_triage(user_role) && !error.status.is_terminal()
}

/// Link and dismiss only apply to notes still waiting for review.
pub fn can_review(user_role: StaffRoleType, note: &UnlinkedDeepCuraNote) -> bool {
    can_triage(user_role) && note.status == UnlinkedNoteStatus::PendingReview
}
