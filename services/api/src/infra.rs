use heritage_admin::workflows::contributors::{
    query, ApplicationId, ApplicationPatch, ContributorApplication, ContributorStatus,
    ContributorStore, ContributorSummary, DirectoryEntry, EventError, EventPublisher,
    NewApplication, Page, SearchQuery, StatusChanged, StoreError,
};

use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory store adapter. Holds the contributor rows plus the user
/// directory projection that feeds listing names and keyword matching.
///
/// The version check in `compare_and_swap` is what makes racing admin
/// sessions safe: the losing writer gets `Conflict` instead of clobbering.
#[derive(Default)]
pub(crate) struct InMemoryContributorStore {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    records: HashMap<ApplicationId, ContributorApplication>,
    directory: HashMap<u64, DirectoryEntry>,
    sequence: u64,
}

impl InMemoryContributorStore {
    pub(crate) fn register_user(&self, user_id: u64, full_name: &str, email: &str) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.directory.insert(
            user_id,
            DirectoryEntry {
                full_name: full_name.to_string(),
                email: email.to_string(),
            },
        );
    }

    fn summarize(inner: &StoreInner, record: &ContributorApplication) -> ContributorSummary {
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

/// `updated_at` must strictly increase even when two writes land within the
/// clock's resolution.
fn strictly_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

impl ContributorStore for InMemoryContributorStore {
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

    fn search(&self, request: &SearchQuery) -> Result<Page<ContributorSummary>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let summaries = inner
            .records
            .values()
            .map(|record| Self::summarize(&inner, record))
            .collect();
        Ok(query::filter_sort_paginate(summaries, request))
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

/// Collects emitted domain events so the demo command (and tests) can show
/// what the notification layer would receive.
#[derive(Default)]
pub(crate) struct InMemoryEventPublisher {
    events: Mutex<Vec<StatusChanged>>,
}

impl EventPublisher for InMemoryEventPublisher {
    fn publish(&self, event: StatusChanged) -> Result<(), EventError> {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .push(event);
        Ok(())
    }
}

impl InMemoryEventPublisher {
    pub(crate) fn events(&self) -> Vec<StatusChanged> {
        self.events.lock().expect("event mutex poisoned").clone()
    }
}
