//! Transition rules for the contributor lifecycle.
//!
//! Pure functions over [`ContributorStatus`]; the workflow service consults
//! them before every write. An action that is not listed for the current
//! status fails outright. Re-invoking an already-applied transition (such as
//! approving an already-active record) fails too: transitions carry side
//! effects (events, count deltas) that must not double-fire, so there is no
//! idempotent success path.

use serde::{Deserialize, Serialize};

use super::domain::ContributorStatus;

/// Named edges of the lifecycle graph. `Edit` is the self-loop on `Active`
/// that permits field updates without a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributorAction {
    Approve,
    Reject,
    Suspend,
    Restore,
    Edit,
}

/// Raised when the requested action has no edge from the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {attempted:?} a contributor application in status {current}")]
pub struct InvalidTransition {
    pub current: ContributorStatus,
    pub attempted: ContributorAction,
}

/// Whether `action` has a legal edge from `current`.
pub const fn can_transition(current: ContributorStatus, action: ContributorAction) -> bool {
    matches!(
        (current, action),
        (ContributorStatus::Applied, ContributorAction::Approve)
            | (ContributorStatus::Applied, ContributorAction::Reject)
            | (ContributorStatus::Active, ContributorAction::Suspend)
            | (ContributorStatus::Active, ContributorAction::Edit)
            | (ContributorStatus::Suspended, ContributorAction::Restore)
    )
}

/// Compute the status after `action`, or fail with the offending pair.
pub fn apply_action(
    current: ContributorStatus,
    action: ContributorAction,
) -> Result<ContributorStatus, InvalidTransition> {
    if !can_transition(current, action) {
        return Err(InvalidTransition { current, attempted: action });
    }

    Ok(match action {
        ContributorAction::Approve | ContributorAction::Restore => ContributorStatus::Active,
        ContributorAction::Reject => ContributorStatus::Rejected,
        ContributorAction::Suspend => ContributorStatus::Suspended,
        ContributorAction::Edit => current,
    })
}
