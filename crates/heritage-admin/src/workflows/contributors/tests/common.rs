use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::workflows::contributors::domain::{
    ActorId, ApplicationId, ApplicationPatch, ContributorApplication, ContributorStatus,
    ContributorSummary, DirectoryEntry, NewApplication, StatusChanged, UserId,
};
use crate::workflows::contributors::query::{filter_sort_paginate, Page, SearchQuery};
use crate::workflows::contributors::repository::{
    ContributorStore, EventError, EventPublisher, StoreError,
};
use crate::workflows::contributors::service::{ApplyRequest, ContributorWorkflowService};

/// In-memory store used across the unit suites. Mirrors the behavior expected
/// of any production adapter: version-checked writes, strictly increasing
/// `updated_at`, uniqueness over non-terminal records, shared pagination.
#[derive(Default)]
pub(super) struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    records: HashMap<ApplicationId, ContributorApplication>,
    directory: HashMap<u64, DirectoryEntry>,
    sequence: u64,
}

impl MemoryStore {
    fn summarize(inner: &MemoryStoreInner, record: &ContributorApplication) -> ContributorSummary {
        let entry = inner.directory.get(&record.user_id.0);
        ContributorSummary {
            id: record.id.clone(),
            user_id: record.user_id,
            display_name: entry
                .map(|entry| entry.full_name.clone())
                .unwrap_or_else(|| format!("user-{}", record.user_id.0)),
            email: entry.map(|entry| entry.email.clone()).unwrap_or_default(),
            status: record.status,
            verified: record.verified,
            premium_eligible: record.premium_eligible,
            created_at: record.created_at,
        }
    }
}

fn strictly_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

impl ContributorStore for MemoryStore {
    fn create(&self, new: NewApplication) -> Result<ContributorApplication, StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if !new.status.is_terminal()
            && inner
                .records
                .values()
                .any(|record| record.user_id == new.user_id && !record.status.is_terminal())
        {
            return Err(StoreError::DuplicateApplication);
        }

        inner.sequence += 1;
        let id = ApplicationId(format!("contrib-{:06}", inner.sequence));
        let now = Utc::now();
        let record = ContributorApplication {
            id: id.clone(),
            user_id: new.user_id,
            bio: new.bio,
            expertise: new.expertise,
            documents_url: new.documents_url,
            status: new.status,
            verified: false,
            premium_eligible: false,
            created_at: now,
            updated_at: now,
            created_by: new.actor.clone(),
            updated_by: new.actor,
            version: 1,
        };
        inner.records.insert(id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ContributorApplication>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.records.get(id).cloned())
    }

    fn compare_and_swap(
        &self,
        id: &ApplicationId,
        expected_version: u64,
        patch: ApplicationPatch,
    ) -> Result<ContributorApplication, StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let record = inner.records.get_mut(id).ok_or(StoreError::NotFound)?;
        if record.version != expected_version {
            return Err(StoreError::Conflict);
        }

        if let Some(bio) = patch.bio {
            record.bio = bio;
        }
        if let Some(expertise) = patch.expertise {
            record.expertise = expertise;
        }
        if let Some(documents_url) = patch.documents_url {
            record.documents_url = documents_url;
        }
        if let Some(verified) = patch.verified {
            record.verified = verified;
        }
        if let Some(premium_eligible) = patch.premium_eligible {
            record.premium_eligible = premium_eligible;
        }
        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(updated_by) = patch.updated_by {
            record.updated_by = updated_by;
        }
        record.version += 1;
        record.updated_at = strictly_after(record.updated_at);
        Ok(record.clone())
    }

    fn search(&self, query: &SearchQuery) -> Result<Page<ContributorSummary>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let summaries = inner
            .records
            .values()
            .map(|record| Self::summarize(&inner, record))
            .collect();
        Ok(filter_sort_paginate(summaries, query))
    }

    fn count_by(&self, status: Option<ContributorStatus>) -> Result<u64, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let count = inner
            .records
            .values()
            .filter(|record| status.map_or(true, |status| record.status == status))
            .count();
        Ok(count as u64)
    }
}

/// Store stub that is always down, for transient-error paths.
pub(super) struct UnavailableStore;

impl ContributorStore for UnavailableStore {
    fn create(&self, _new: NewApplication) -> Result<ContributorApplication, StoreError> {
        Err(StoreError::Unavailable("maintenance window".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ContributorApplication>, StoreError> {
        Err(StoreError::Unavailable("maintenance window".to_string()))
    }

    fn compare_and_swap(
        &self,
        _id: &ApplicationId,
        _expected_version: u64,
        _patch: ApplicationPatch,
    ) -> Result<ContributorApplication, StoreError> {
        Err(StoreError::Unavailable("maintenance window".to_string()))
    }

    fn search(&self, _query: &SearchQuery) -> Result<Page<ContributorSummary>, StoreError> {
        Err(StoreError::Unavailable("maintenance window".to_string()))
    }

    fn count_by(&self, _status: Option<ContributorStatus>) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("maintenance window".to_string()))
    }
}

/// Recording publisher so suites can assert exactly-once event emission.
#[derive(Default)]
pub(super) struct MemoryEvents {
    events: Mutex<Vec<StatusChanged>>,
}

impl EventPublisher for MemoryEvents {
    fn publish(&self, event: StatusChanged) -> Result<(), EventError> {
        self.events.lock().expect("event mutex poisoned").push(event);
        Ok(())
    }
}

impl MemoryEvents {
    pub(super) fn events(&self) -> Vec<StatusChanged> {
        self.events.lock().expect("event mutex poisoned").clone()
    }
}

pub(super) fn actor(name: &str) -> ActorId {
    ActorId(name.to_string())
}

pub(super) fn apply_request() -> ApplyRequest {
    ApplyRequest {
        bio: "Medievalist focused on illuminated manuscripts".to_string(),
        expertise: "Paleography".to_string(),
        documents_url: Some("https://example.org/portfolio.pdf".to_string()),
    }
}

pub(super) fn service(
    store: Arc<MemoryStore>,
    events: Arc<MemoryEvents>,
) -> ContributorWorkflowService<MemoryStore, MemoryEvents> {
    ContributorWorkflowService::new(store, events)
}

/// Summary builder for the pure query/pagination suites.
pub(super) fn summary(
    id: u32,
    name: &str,
    email: &str,
    status: ContributorStatus,
    day: u32,
) -> ContributorSummary {
    ContributorSummary {
        id: ApplicationId(format!("contrib-{id:06}")),
        user_id: UserId(u64::from(id)),
        display_name: name.to_string(),
        email: email.to_string(),
        status,
        verified: false,
        premium_eligible: false,
        created_at: Utc
            .with_ymd_and_hms(2026, 3, day, 12, 0, 0)
            .single()
            .expect("valid fixture date"),
    }
}
