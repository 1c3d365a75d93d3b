use super::domain::{
    ApplicationId, ApplicationPatch, ContributorApplication, ContributorStatus,
    ContributorSummary, NewApplication, StatusChanged,
};
use super::query::{Page, SearchQuery};

/// Storage contract for contributor applications.
///
/// `compare_and_swap` is the sole write path used by the workflow service:
/// it fails with [`StoreError::Conflict`] when the stored version no longer
/// matches what the caller last read, forcing a reload instead of a blind
/// overwrite. Records are never physically deleted.
pub trait ContributorStore: Send + Sync {
    /// Insert a new application. The store assigns the id, sets `version` to
    /// 1 and stamps both timestamps. Fails with
    /// [`StoreError::DuplicateApplication`] when a non-terminal record
    /// already exists for the same user.
    fn create(&self, new: NewApplication) -> Result<ContributorApplication, StoreError>;

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ContributorApplication>, StoreError>;

    /// Apply `patch` iff the stored version equals `expected_version`. On
    /// success the version is bumped and `updated_at` strictly increases.
    fn compare_and_swap(
        &self,
        id: &ApplicationId,
        expected_version: u64,
        patch: ApplicationPatch,
    ) -> Result<ContributorApplication, StoreError>;

    /// Filtered, sorted, paginated listing. Implementations are expected to
    /// delegate ordering and slicing to [`super::query::filter_sort_paginate`]
    /// so every adapter paginates identically.
    fn search(&self, query: &SearchQuery) -> Result<Page<ContributorSummary>, StoreError>;

    /// Count records in `status`, or all records when `None`. Dedicated
    /// aggregate query; never a full-table fetch on the caller side.
    fn count_by(&self, status: Option<ContributorStatus>) -> Result<u64, StoreError>;
}

/// Error enumeration for store failures. `Unavailable` is the only
/// transient/retryable class; everything else is a caller decision point.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("contributor application not found")]
    NotFound,
    #[error("stored version changed since last read")]
    Conflict,
    #[error("a pending or active application already exists for this user")]
    DuplicateApplication,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound seam for the notification collaborator. Consumers render toasts
/// or send mail; the core only emits.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: StatusChanged) -> Result<(), EventError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("event transport unavailable: {0}")]
    Transport(String),
}
