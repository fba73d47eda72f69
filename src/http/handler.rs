//! HTTP handlers for the space API
//!
//! Caller identity comes from the `x-user-id` header; verifying it is the
//! job of an upstream auth proxy. Reads that allow anonymous access treat
//! a missing header as a public caller.

use crate::algo::visibility::{TreeMode, DEFAULT_GENERATIONS};
use crate::graph::{GraphError, PersonId, PersonInput, PersonPatch, RelationshipId, RelationshipInput};
use crate::space::{ClaimId, Role, SpaceError, SpaceId, SpaceManager, UserId};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub type AppState = Arc<SpaceManager>;

/// API error carrying an HTTP status
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Missing x-user-id header")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<SpaceError> for ApiError {
    fn from(err: SpaceError) -> Self {
        let status = match &err {
            SpaceError::UserNotFound(_)
            | SpaceError::SpaceNotFound(_)
            | SpaceError::ClaimNotFound(_) => StatusCode::NOT_FOUND,

            SpaceError::NotAMember(_)
            | SpaceError::InsufficientRole { .. }
            | SpaceError::NoEditPermission(_)
            | SpaceError::OutsideBranch => StatusCode::FORBIDDEN,

            SpaceError::EmailTaken(_)
            | SpaceError::DuplicateClaim
            | SpaceError::PersonAlreadyClaimed
            | SpaceError::UserAlreadyLinked
            | SpaceError::ClaimNotPending(_) => StatusCode::CONFLICT,

            SpaceError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,

            SpaceError::InvitationInvalid => StatusCode::BAD_REQUEST,

            SpaceError::Graph(graph_err) => match graph_err {
                GraphError::PersonNotFound(_) | GraphError::RelationshipNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                _ => StatusCode::BAD_REQUEST,
            },

            SpaceError::Snapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.to_string())
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Optional caller identity
fn caller(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(UserId::from)
}

/// Required caller identity
fn require_caller(headers: &HeaderMap) -> ApiResult<UserId> {
    caller(headers).ok_or_else(ApiError::unauthorized)
}

// ---- status ----

pub async fn status_handler(State(manager): State<AppState>) -> impl IntoResponse {
    let (spaces, users, people, relationships) = manager.counts();
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "storage": {
            "spaces": spaces,
            "users": users,
            "people": people,
            "relationships": relationships,
        }
    }))
}

// ---- users ----

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub name: String,
}

pub async fn register_user(
    State(manager): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> ApiResult<Response> {
    let user = manager.register_user(&payload.email, &payload.name)?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

// ---- spaces ----

#[derive(Deserialize)]
pub struct CreateSpaceRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn create_space(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateSpaceRequest>,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    let space = manager.create_space(&user, &payload.name, payload.description)?;
    Ok((StatusCode::CREATED, Json(space)).into_response())
}

pub async fn list_spaces(
    State(manager): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    let summaries = manager.spaces_for_user(&user)?;
    Ok(Json(summaries).into_response())
}

pub async fn get_space(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path(space): Path<String>,
) -> ApiResult<Response> {
    let overview = manager.overview(&SpaceId(space), caller(&headers).as_ref())?;
    Ok(Json(overview).into_response())
}

pub async fn list_members(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path(space): Path<String>,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    let members = manager.members(&SpaceId(space), &user)?;
    Ok(Json(members).into_response())
}

// ---- people ----

pub async fn create_person(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path(space): Path<String>,
    Json(input): Json<PersonInput>,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    let person = manager.create_person(&SpaceId(space), &user, input)?;
    Ok((StatusCode::CREATED, Json(person)).into_response())
}

pub async fn update_person(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path((space, person)): Path<(String, u64)>,
    Json(patch): Json<PersonPatch>,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    let person = manager.update_person(&SpaceId(space), &user, PersonId::new(person), patch)?;
    Ok(Json(person).into_response())
}

pub async fn delete_person(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path((space, person)): Path<(String, u64)>,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    manager.delete_person(&SpaceId(space), &user, PersonId::new(person))?;
    Ok(Json(json!({ "deleted": true })).into_response())
}

// ---- relationships ----

pub async fn create_relationship(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path(space): Path<String>,
    Json(input): Json<RelationshipInput>,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    let rel = manager.create_relationship(&SpaceId(space), &user, input)?;
    Ok((StatusCode::CREATED, Json(rel)).into_response())
}

pub async fn delete_relationship(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path((space, rel)): Path<(String, u64)>,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    manager.delete_relationship(&SpaceId(space), &user, RelationshipId::new(rel))?;
    Ok(Json(json!({ "deleted": true })).into_response())
}

// ---- tree and search ----

#[derive(Deserialize)]
pub struct TreeQuery {
    #[serde(default)]
    pub focus: Option<u64>,
    #[serde(default)]
    pub mode: Option<TreeMode>,
    #[serde(default)]
    pub generations: Option<u32>,
}

pub async fn tree_handler(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path(space): Path<String>,
    Query(query): Query<TreeQuery>,
) -> ApiResult<Response> {
    let view = manager.tree_view(
        &SpaceId(space),
        caller(&headers).as_ref(),
        query.focus.map(PersonId::new),
        query.mode.unwrap_or_default(),
        query.generations.unwrap_or(DEFAULT_GENERATIONS),
    )?;
    Ok(Json(view).into_response())
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn search_handler(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path(space): Path<String>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Response> {
    let people = manager.search(&SpaceId(space), caller(&headers).as_ref(), &query.q)?;
    Ok(Json(people).into_response())
}

// ---- invitations ----

#[derive(Deserialize, Default)]
pub struct CreateInvitationRequest {
    #[serde(default)]
    pub role: Option<Role>,
}

pub async fn create_invitation(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path(space): Path<String>,
    payload: Option<Json<CreateInvitationRequest>>,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    let role = payload
        .map(|Json(p)| p.role.unwrap_or_default())
        .unwrap_or_default();
    let invitation = manager.create_invitation(&SpaceId(space), &user, role)?;
    Ok((StatusCode::CREATED, Json(invitation)).into_response())
}

pub async fn accept_invitation(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    let space = manager.accept_invitation(&user, &token)?;
    Ok(Json(json!({ "space_id": space })).into_response())
}

// ---- claims ----

#[derive(Deserialize)]
pub struct SubmitClaimRequest {
    pub person_id: u64,
}

pub async fn submit_claim(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path(space): Path<String>,
    Json(payload): Json<SubmitClaimRequest>,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    let claim = manager.submit_claim(&SpaceId(space), &user, PersonId::new(payload.person_id))?;
    Ok((StatusCode::CREATED, Json(claim)).into_response())
}

pub async fn pending_claims(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path(space): Path<String>,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    let claims = manager.pending_claims(&SpaceId(space), &user)?;
    Ok(Json(claims).into_response())
}

pub async fn approve_claim(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path((space, claim)): Path<(String, u64)>,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    manager.approve_claim(&SpaceId(space), &user, ClaimId::new(claim))?;
    Ok(Json(json!({ "approved": true })).into_response())
}

pub async fn reject_claim(
    State(manager): State<AppState>,
    headers: HeaderMap,
    Path((space, claim)): Path<(String, u64)>,
) -> ApiResult<Response> {
    let user = require_caller(&headers)?;
    manager.reject_claim(&SpaceId(space), &user, ClaimId::new(claim))?;
    Ok(Json(json!({ "rejected": true })).into_response())
}
