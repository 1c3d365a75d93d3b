use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::counts::StatusTally;
use super::domain::{ActorId, ApplicationId, ContributorStatus, UserId};
use super::query::{ContributorSearch, SearchError, SearchQuery, SortOrder, DEFAULT_PAGE_SIZE};
use super::repository::{ContributorStore, EventPublisher};
use super::service::{
    AdminCreateRequest, ApplyRequest, ContributorWorkflowService, UpdateRequest, WorkflowError,
};

/// Header carrying the opaque actor id supplied by the identity collaborator.
/// The core never authenticates; it only records the reference.
pub const ACTOR_HEADER: &str = "x-acting-user";

/// Handler state bundling the workflow facade with the two read paths.
pub struct ContributorState<S, E> {
    pub service: Arc<ContributorWorkflowService<S, E>>,
    pub search: Arc<ContributorSearch<S>>,
    pub tally: Arc<StatusTally<S>>,
    pub default_page_size: u32,
}

impl<S, E> Clone for ContributorState<S, E> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            search: self.search.clone(),
            tally: self.tally.clone(),
            default_page_size: self.default_page_size,
        }
    }
}

impl<S, E> ContributorState<S, E>
where
    S: ContributorStore + 'static,
    E: EventPublisher + 'static,
{
    pub fn new(store: Arc<S>, events: Arc<E>) -> Self {
        Self {
            service: Arc::new(ContributorWorkflowService::new(store.clone(), events)),
            search: Arc::new(ContributorSearch::new(store.clone())),
            tally: Arc::new(StatusTally::new(store)),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }
}

/// Router builder exposing the contributor workflow over HTTP.
pub fn contributor_router<S, E>(state: ContributorState<S, E>) -> Router
where
    S: ContributorStore + 'static,
    E: EventPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/contributors",
            get(search_handler::<S, E>).post(admin_create_handler::<S, E>),
        )
        .route("/api/v1/contributors/counts", get(counts_handler::<S, E>))
        .route("/api/v1/contributors/apply", post(apply_handler::<S, E>))
        .route(
            "/api/v1/contributors/:id",
            get(detail_handler::<S, E>).patch(update_handler::<S, E>),
        )
        .route(
            "/api/v1/contributors/:id/:action",
            post(transition_handler::<S, E>),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchParams {
    pub(crate) keyword: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) sort: Option<String>,
    pub(crate) page: Option<u32>,
    pub(crate) page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplyBody {
    pub(crate) bio: String,
    pub(crate) expertise: String,
    #[serde(default)]
    pub(crate) documents_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdminCreateBody {
    pub(crate) user_id: u64,
    #[serde(default)]
    pub(crate) bio: Option<String>,
    #[serde(default)]
    pub(crate) expertise: Option<String>,
    #[serde(default)]
    pub(crate) initial_status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UpdateBody {
    #[serde(default)]
    pub(crate) bio: Option<String>,
    #[serde(default)]
    pub(crate) expertise: Option<String>,
    #[serde(default)]
    pub(crate) documents_url: Option<String>,
    /// Explicit flag instead of a JSON-null sentinel so a patch can clear the
    /// evidence URL unambiguously.
    #[serde(default)]
    pub(crate) clear_documents_url: bool,
    #[serde(default)]
    pub(crate) verified: Option<bool>,
    #[serde(default)]
    pub(crate) premium_eligible: Option<bool>,
}

pub(crate) async fn search_handler<S, E>(
    State(state): State<ContributorState<S, E>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    S: ContributorStore + 'static,
    E: EventPublisher + 'static,
{
    let status = match params.status.as_deref().map(ContributorStatus::from_str) {
        Some(Err(err)) => return unprocessable(&err.to_string()),
        Some(Ok(status)) => Some(status),
        None => None,
    };
    let sort = match params.sort.as_deref().map(SortOrder::from_str) {
        Some(Err(err)) => return unprocessable(&err.to_string()),
        Some(Ok(sort)) => sort,
        None => SortOrder::default(),
    };

    let query = SearchQuery {
        keyword: params.keyword,
        status,
        sort,
        page: params.page.unwrap_or(1),
        page_size: params.page_size.unwrap_or(state.default_page_size),
    };

    match state.search.search(&query) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(SearchError::Query(err)) => unprocessable(&err.to_string()),
        Err(SearchError::Store(err)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn counts_handler<S, E>(
    State(state): State<ContributorState<S, E>>,
) -> Response
where
    S: ContributorStore + 'static,
    E: EventPublisher + 'static,
{
    match state.tally.snapshot() {
        Ok(counts) => (StatusCode::OK, axum::Json(counts)).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn detail_handler<S, E>(
    State(state): State<ContributorState<S, E>>,
    Path(id): Path<String>,
) -> Response
where
    S: ContributorStore + 'static,
    E: EventPublisher + 'static,
{
    let id = ApplicationId(id);
    match state.service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => workflow_error_response(&err),
    }
}

pub(crate) async fn apply_handler<S, E>(
    State(state): State<ContributorState<S, E>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<ApplyBody>,
) -> Response
where
    S: ContributorStore + 'static,
    E: EventPublisher + 'static,
{
    let actor = match require_actor(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    // Self-service: the caller's identity is the applying user.
    let user_id = match actor.0.parse::<u64>() {
        Ok(raw) => UserId(raw),
        Err(_) => return unprocessable("acting user id must be numeric for self-service apply"),
    };

    let request = ApplyRequest {
        bio: body.bio,
        expertise: body.expertise,
        documents_url: body.documents_url,
    };
    match state.service.apply(user_id, actor, request) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => workflow_error_response(&err),
    }
}

pub(crate) async fn admin_create_handler<S, E>(
    State(state): State<ContributorState<S, E>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<AdminCreateBody>,
) -> Response
where
    S: ContributorStore + 'static,
    E: EventPublisher + 'static,
{
    let actor = match require_actor(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let initial_status = match body.initial_status.as_deref().map(ContributorStatus::from_str) {
        Some(Err(err)) => return unprocessable(&err.to_string()),
        Some(Ok(status)) => Some(status),
        None => None,
    };

    let request = AdminCreateRequest {
        bio: body.bio,
        expertise: body.expertise,
        initial_status,
    };
    match state.service.admin_create(UserId(body.user_id), actor, request) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => workflow_error_response(&err),
    }
}

pub(crate) async fn transition_handler<S, E>(
    State(state): State<ContributorState<S, E>>,
    headers: HeaderMap,
    Path((id, action)): Path<(String, String)>,
) -> Response
where
    S: ContributorStore + 'static,
    E: EventPublisher + 'static,
{
    let actor = match require_actor(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let id = ApplicationId(id);
    let result = match action.as_str() {
        "approve" => state.service.approve(&id, actor),
        "reject" => state.service.reject(&id, actor),
        "suspend" => state.service.suspend(&id, actor),
        "restore" => state.service.restore(&id, actor),
        other => {
            let payload = json!({ "error": format!("unknown action '{other}'") });
            return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
        }
    };

    match result {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => workflow_error_response(&err),
    }
}

pub(crate) async fn update_handler<S, E>(
    State(state): State<ContributorState<S, E>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<UpdateBody>,
) -> Response
where
    S: ContributorStore + 'static,
    E: EventPublisher + 'static,
{
    let actor = match require_actor(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let documents_url = if body.clear_documents_url {
        Some(None)
    } else {
        body.documents_url.map(Some)
    };
    let request = UpdateRequest {
        bio: body.bio,
        expertise: body.expertise,
        documents_url,
        verified: body.verified,
        premium_eligible: body.premium_eligible,
    };

    let id = ApplicationId(id);
    match state.service.update(&id, actor, request) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => workflow_error_response(&err),
    }
}

fn require_actor(headers: &HeaderMap) -> Result<ActorId, Response> {
    let value = headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match value {
        Some(actor) => Ok(ActorId(actor.to_string())),
        None => {
            let payload = json!({ "error": "missing actor", "header": ACTOR_HEADER });
            Err((StatusCode::BAD_REQUEST, axum::Json(payload)).into_response())
        }
    }
}

fn unprocessable(message: &str) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

/// Map workflow failures to HTTP. The three 409 shapes carry distinct codes
/// so the dashboard can tell "reload and retry" apart from "not legal now".
fn workflow_error_response(err: &WorkflowError) -> Response {
    let (status, code) = match err {
        WorkflowError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
        WorkflowError::Duplicate => (StatusCode::CONFLICT, "duplicate_application"),
        WorkflowError::Transition(_) => (StatusCode::CONFLICT, "invalid_transition"),
        WorkflowError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        WorkflowError::Conflict => (StatusCode::CONFLICT, "conflict"),
        WorkflowError::Transient(_) => (StatusCode::SERVICE_UNAVAILABLE, "transient"),
        WorkflowError::Event(_) => (StatusCode::INTERNAL_SERVER_ERROR, "event"),
    };
    let payload = json!({ "error": err.to_string(), "code": code });
    (status, axum::Json(payload)).into_response()
}
