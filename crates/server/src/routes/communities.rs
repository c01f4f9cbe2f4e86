use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use service::access::can_create;
use service::auth::domain::Principal;
use service::community::domain::{Community, CommunityDraft};

use super::scope;
use crate::errors::{ApiError, OrNotFound};
use crate::state::CommunityState;

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/communities",
    tag = "communities",
    params(("name" = Option<String>, Query, description = "Exact community name")),
    responses(
        (status = 200, description = "Communities, largest first, or the single match", body = [crate::openapi::CommunityDoc]),
        (status = 404, description = "No community with that name"),
    )
)]
pub async fn find(State(state): State<CommunityState>, Query(q): Query<NameQuery>) -> Result<Response, ApiError> {
    if let Some(name) = q.name {
        let community = state
            .communities
            .find_by_name(&name)
            .await?
            .or_not_found(|| format!("No community with name {name}"))?;
        return Ok(Json(community).into_response());
    }
    Ok(Json(state.communities.find_all().await?).into_response())
}

#[utoipa::path(
    get,
    path = "/communities/{cid}",
    tag = "communities",
    params(("cid" = i32, Path, description = "Community id")),
    responses((status = 200, body = crate::openapi::CommunityDoc), (status = 404, description = "No such community"))
)]
pub async fn get(State(state): State<CommunityState>, Path(cid): Path<i32>) -> Result<Json<Community>, ApiError> {
    Ok(Json(scope::community(&state, cid).await?))
}

#[utoipa::path(
    post,
    path = "/communities",
    tag = "communities",
    request_body = crate::openapi::CommunityDraftDoc,
    responses(
        (status = 201, body = crate::openapi::CommunityDoc),
        (status = 400, description = "Invalid, duplicate or unknown admin", body = crate::openapi::ErrorResponse),
        (status = 403, description = "adminLogin is not the caller"),
    )
)]
pub async fn create(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Json(draft): Json<CommunityDraft>,
) -> Result<(StatusCode, Json<Community>), ApiError> {
    if !can_create(Some(&principal), draft.admin_login.as_deref()) {
        return Err(ApiError::Forbidden);
    }
    let saved = state.communities.save(draft).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(
    patch,
    path = "/communities/{cid}",
    tag = "communities",
    params(("cid" = i32, Path, description = "Community id")),
    request_body = crate::openapi::CommunityDraftDoc,
    responses((status = 200, body = crate::openapi::CommunityDoc), (status = 403, description = "Access is denied"))
)]
pub async fn patch(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path(cid): Path<i32>,
    Json(draft): Json<CommunityDraft>,
) -> Result<Json<Community>, ApiError> {
    if !state.community_access.can_patch(Some(&principal), &cid).await {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(state.communities.update(cid, draft).await?))
}

#[utoipa::path(
    delete,
    path = "/communities/{cid}",
    tag = "communities",
    params(("cid" = i32, Path, description = "Community id")),
    responses((status = 204, description = "Deleted with posts, comments and likes"), (status = 403, description = "Access is denied"))
)]
pub async fn delete(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path(cid): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if !state.community_access.can_delete(Some(&principal), &cid).await {
        return Err(ApiError::Forbidden);
    }
    state.communities.delete_by_id(cid).await?;
    Ok(StatusCode::NO_CONTENT)
}
