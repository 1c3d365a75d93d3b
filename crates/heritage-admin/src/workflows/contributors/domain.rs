use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for contributor applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to an external User entity. The platform user directory owns the
/// person; this subsystem stores only the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Opaque actor reference (admin or self) recorded for audit only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorId(pub String);

/// Lifecycle status of a contributor application.
///
/// This is the single canonical representation; every ingress path (HTTP
/// params, stored rows) normalizes to it once, so the transition rules in
/// [`super::state`] never branch on spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributorStatus {
    Applied,
    Active,
    Rejected,
    Suspended,
}

impl ContributorStatus {
    pub const ALL: [ContributorStatus; 4] = [
        ContributorStatus::Applied,
        ContributorStatus::Active,
        ContributorStatus::Rejected,
        ContributorStatus::Suspended,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ContributorStatus::Applied => "applied",
            ContributorStatus::Active => "active",
            ContributorStatus::Rejected => "rejected",
            ContributorStatus::Suspended => "suspended",
        }
    }

    /// Rejected is the only terminal status; a rejected user may submit a
    /// fresh application, which supersedes the old record.
    pub const fn is_terminal(self) -> bool {
        matches!(self, ContributorStatus::Rejected)
    }
}

impl FromStr for ContributorStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "applied" => Ok(ContributorStatus::Applied),
            "active" => Ok(ContributorStatus::Active),
            "rejected" => Ok(ContributorStatus::Rejected),
            "suspended" => Ok(ContributorStatus::Suspended),
            _ => Err(UnknownStatus(value.to_string())),
        }
    }
}

impl fmt::Display for ContributorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown contributor status '{0}'")]
pub struct UnknownStatus(pub String);

/// Full contributor application record as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorApplication {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub bio: String,
    pub expertise: String,
    pub documents_url: Option<String>,
    pub status: ContributorStatus,
    pub verified: bool,
    pub premium_eligible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: ActorId,
    pub updated_by: ActorId,
    /// Optimistic-concurrency token; bumped by every successful write.
    pub version: u64,
}

/// Input for the store's create path. The store assigns the id, version, and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub user_id: UserId,
    pub bio: String,
    pub expertise: String,
    pub documents_url: Option<String>,
    pub status: ContributorStatus,
    pub actor: ActorId,
}

/// Partial write submitted through `compare_and_swap`. `documents_url` is a
/// double option so a patch can clear the URL as well as replace it. `status`
/// is only ever set by the workflow service after a transition check.
#[derive(Debug, Clone, Default)]
pub struct ApplicationPatch {
    pub bio: Option<String>,
    pub expertise: Option<String>,
    pub documents_url: Option<Option<String>>,
    pub verified: Option<bool>,
    pub premium_eligible: Option<bool>,
    pub status: Option<ContributorStatus>,
    pub updated_by: Option<ActorId>,
}

/// Name and email the user directory knows a platform user by. The store
/// keeps this projection (lowercased for matching) purely for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub full_name: String,
    pub email: String,
}

/// Listing projection served by search pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorSummary {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub display_name: String,
    pub email: String,
    pub status: ContributorStatus,
    pub verified: bool,
    pub premium_eligible: bool,
    pub created_at: DateTime<Utc>,
}

/// Domain event emitted after a successful status change. The notification
/// layer subscribes; the core never renders anything.
///
/// `from` is `None` when the record was just created (self-service apply or
/// admin create).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub id: ApplicationId,
    pub from: Option<ContributorStatus>,
    pub to: ContributorStatus,
    pub actor: ActorId,
}
