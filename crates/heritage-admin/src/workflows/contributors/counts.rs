//! Per-status tallies for the listing tab badges.
//!
//! Deliberately independent of any active keyword filter: badges answer "how
//! many records are in each status globally", not "how many match the current
//! search". Callers re-take a snapshot after every successful transition.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::ContributorStatus;
use super::repository::{ContributorStore, StoreError};

/// One count per status plus the grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub applied: u64,
    pub active: u64,
    pub rejected: u64,
    pub suspended: u64,
    pub all: u64,
}

impl StatusCounts {
    pub fn get(&self, status: ContributorStatus) -> u64 {
        match status {
            ContributorStatus::Applied => self.applied,
            ContributorStatus::Active => self.active,
            ContributorStatus::Rejected => self.rejected,
            ContributorStatus::Suspended => self.suspended,
        }
    }

    /// Holds on any quiescent snapshot; concurrent writes may skew a snapshot
    /// taken mid-mutation, which is acceptable for advisory badges.
    pub fn is_consistent(&self) -> bool {
        self.applied + self.active + self.rejected + self.suspended == self.all
    }
}

/// Aggregator issuing one dedicated count query per status, never a
/// full-table fetch filtered on the caller side.
pub struct StatusTally<S> {
    store: Arc<S>,
}

impl<S: ContributorStore> StatusTally<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn snapshot(&self) -> Result<StatusCounts, StoreError> {
        Ok(StatusCounts {
            applied: self.store.count_by(Some(ContributorStatus::Applied))?,
            active: self.store.count_by(Some(ContributorStatus::Active))?,
            rejected: self.store.count_by(Some(ContributorStatus::Rejected))?,
            suspended: self.store.count_by(Some(ContributorStatus::Suspended))?,
            all: self.store.count_by(None)?,
        })
    }
}
