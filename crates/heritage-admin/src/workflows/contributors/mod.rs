//! Contributor lifecycle workflow: application intake, review transitions,
//! filtered listings, and per-status tallies.
//!
//! A contributor application moves through a small, closed status graph
//! (`applied` → `active`/`rejected`, `active` ⇄ `suspended`). The workflow
//! service guards every write with the transition rules in [`state`] and a
//! versioned compare-and-swap against the [`repository::ContributorStore`],
//! so racing admin sessions resolve deterministically: exactly one wins, the
//! other is told to reload. Listings and tab counts are independent read
//! paths over the same store.

pub mod counts;
pub mod domain;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;
pub mod state;

#[cfg(test)]
mod tests;

pub use counts::{StatusCounts, StatusTally};
pub use domain::{
    ActorId, ApplicationId, ApplicationPatch, ContributorApplication, ContributorStatus,
    ContributorSummary, DirectoryEntry, NewApplication, StatusChanged, UnknownStatus, UserId,
};
pub use query::{
    ContributorSearch, Page, QueryError, SearchError, SearchQuery, SortOrder, DEFAULT_PAGE_SIZE,
};
pub use repository::{ContributorStore, EventError, EventPublisher, StoreError};
pub use router::{contributor_router, ContributorState, ACTOR_HEADER};
pub use service::{
    AdminCreateRequest, ApplyRequest, ContributorWorkflowService, UpdateRequest, WorkflowError,
};
pub use state::{apply_action, can_transition, ContributorAction, InvalidTransition};
