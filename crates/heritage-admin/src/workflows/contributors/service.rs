use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{
    ActorId, ApplicationId, ApplicationPatch, ContributorApplication, ContributorStatus,
    NewApplication, StatusChanged, UserId,
};
use super::repository::{ContributorStore, EventError, EventPublisher, StoreError};
use super::state::{self, ContributorAction, InvalidTransition};

/// Orchestrates the contributor lifecycle: each operation is one transition
/// check plus one compare-and-swap, followed by at most one domain event.
///
/// Optimistic concurrency only. When a swap loses a race the caller gets
/// [`WorkflowError::Conflict`] and must re-fetch and re-decide; the service
/// never retries a business-rule failure on its own.
pub struct ContributorWorkflowService<S, E> {
    store: Arc<S>,
    events: Arc<E>,
}

/// Self-service application payload. `bio` and `expertise` are required
/// non-blank at apply time.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub bio: String,
    pub expertise: String,
    pub documents_url: Option<String>,
}

/// Admin-initiated creation. The initial status defaults to `Applied` but may
/// be any status per deployment policy; the one-non-terminal-per-user
/// invariant applies regardless of the chosen entry point.
#[derive(Debug, Clone, Default)]
pub struct AdminCreateRequest {
    pub bio: Option<String>,
    pub expertise: Option<String>,
    pub initial_status: Option<ContributorStatus>,
}

/// Field edit for an active contributor. May never touch `status`;
/// `documents_url` uses a double option so `Some(None)` clears the URL.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    pub bio: Option<String>,
    pub expertise: Option<String>,
    pub documents_url: Option<Option<String>>,
    pub verified: Option<bool>,
    pub premium_eligible: Option<bool>,
}

impl<S, E> ContributorWorkflowService<S, E>
where
    S: ContributorStore + 'static,
    E: EventPublisher + 'static,
{
    pub fn new(store: Arc<S>, events: Arc<E>) -> Self {
        Self { store, events }
    }

    /// Submit a new self-service application, landing in `Applied`.
    pub fn apply(
        &self,
        user_id: UserId,
        actor: ActorId,
        request: ApplyRequest,
    ) -> Result<ContributorApplication, WorkflowError> {
        if request.bio.trim().is_empty() {
            return Err(WorkflowError::Validation("bio must not be blank".into()));
        }
        if request.expertise.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "expertise must not be blank".into(),
            ));
        }

        let created = self.store.create(NewApplication {
            user_id,
            bio: request.bio,
            expertise: request.expertise,
            documents_url: request.documents_url,
            status: ContributorStatus::Applied,
            actor: actor.clone(),
        })?;

        info!(id = %created.id, user_id = created.user_id.0, "contributor application received");
        self.events.publish(StatusChanged {
            id: created.id.clone(),
            from: None,
            to: created.status,
            actor,
        })?;
        Ok(created)
    }

    /// Admin entry point that may start the record at any status. Subject to
    /// the same uniqueness invariant as `apply`.
    pub fn admin_create(
        &self,
        user_id: UserId,
        actor: ActorId,
        request: AdminCreateRequest,
    ) -> Result<ContributorApplication, WorkflowError> {
        let status = request.initial_status.unwrap_or(ContributorStatus::Applied);
        let created = self.store.create(NewApplication {
            user_id,
            bio: request.bio.unwrap_or_default(),
            expertise: request.expertise.unwrap_or_default(),
            documents_url: None,
            status,
            actor: actor.clone(),
        })?;

        info!(
            id = %created.id,
            user_id = created.user_id.0,
            status = %created.status,
            "contributor record created by admin"
        );
        self.events.publish(StatusChanged {
            id: created.id.clone(),
            from: None,
            to: created.status,
            actor,
        })?;
        Ok(created)
    }

    pub fn approve(
        &self,
        id: &ApplicationId,
        actor: ActorId,
    ) -> Result<ContributorApplication, WorkflowError> {
        self.transition(id, actor, ContributorAction::Approve)
    }

    pub fn reject(
        &self,
        id: &ApplicationId,
        actor: ActorId,
    ) -> Result<ContributorApplication, WorkflowError> {
        self.transition(id, actor, ContributorAction::Reject)
    }

    pub fn suspend(
        &self,
        id: &ApplicationId,
        actor: ActorId,
    ) -> Result<ContributorApplication, WorkflowError> {
        self.transition(id, actor, ContributorAction::Suspend)
    }

    pub fn restore(
        &self,
        id: &ApplicationId,
        actor: ActorId,
    ) -> Result<ContributorApplication, WorkflowError> {
        self.transition(id, actor, ContributorAction::Restore)
    }

    /// Edit fields of an active contributor. No status change, no event.
    pub fn update(
        &self,
        id: &ApplicationId,
        actor: ActorId,
        request: UpdateRequest,
    ) -> Result<ContributorApplication, WorkflowError> {
        let current = self.store.fetch(id)?.ok_or(WorkflowError::NotFound)?;
        state::apply_action(current.status, ContributorAction::Edit)?;

        let patch = ApplicationPatch {
            bio: request.bio,
            expertise: request.expertise,
            documents_url: request.documents_url,
            verified: request.verified,
            premium_eligible: request.premium_eligible,
            status: None,
            updated_by: Some(actor),
        };
        let updated = self.store.compare_and_swap(id, current.version, patch)?;
        debug!(id = %updated.id, version = updated.version, "contributor fields updated");
        Ok(updated)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<ContributorApplication, WorkflowError> {
        self.store.fetch(id)?.ok_or(WorkflowError::NotFound)
    }

    fn transition(
        &self,
        id: &ApplicationId,
        actor: ActorId,
        action: ContributorAction,
    ) -> Result<ContributorApplication, WorkflowError> {
        let current = self.store.fetch(id)?.ok_or(WorkflowError::NotFound)?;
        let next = state::apply_action(current.status, action)?;

        let patch = ApplicationPatch {
            status: Some(next),
            updated_by: Some(actor.clone()),
            ..ApplicationPatch::default()
        };
        let updated = self.store.compare_and_swap(id, current.version, patch)?;

        info!(
            id = %updated.id,
            from = %current.status,
            to = %next,
            actor = %actor.0,
            "contributor status changed"
        );
        self.events.publish(StatusChanged {
            id: updated.id.clone(),
            from: Some(current.status),
            to: next,
            actor,
        })?;
        Ok(updated)
    }
}

/// Error raised by the workflow service.
///
/// Only `Transient` is safe to retry; a retried transition that already took
/// effect fails with `InvalidTransition` on the second attempt, so event side
/// effects cannot double-fire. `(id, action, actor)` identifies the attempt
/// in the logs.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),
    #[error("a pending or active application already exists for this user")]
    Duplicate,
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error("contributor application not found")]
    NotFound,
    #[error("the record changed since it was read; reload and re-decide")]
    Conflict,
    #[error("store unavailable: {0}")]
    Transient(String),
    #[error(transparent)]
    Event(#[from] EventError),
}

impl WorkflowError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkflowError::Transient(_))
    }
}

impl From<StoreError> for WorkflowError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => WorkflowError::NotFound,
            StoreError::Conflict => WorkflowError::Conflict,
            StoreError::DuplicateApplication => WorkflowError::Duplicate,
            StoreError::Unavailable(reason) => WorkflowError::Transient(reason),
        }
    }
}
