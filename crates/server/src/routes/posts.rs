use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use service::access::can_create;
use service::auth::domain::Principal;
use service::community::domain::{Post, PostDraft};

use super::scope;
use crate::errors::ApiError;
use crate::state::CommunityState;

#[utoipa::path(
    get,
    path = "/communities/{cid}/posts",
    tag = "posts",
    params(("cid" = i32, Path, description = "Community id")),
    responses((status = 200, description = "Posts, oldest first"), (status = 404, description = "No such community"))
)]
pub async fn list(State(state): State<CommunityState>, Path(cid): Path<i32>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.posts.find_all_by_community_id(cid).await?))
}

#[utoipa::path(
    get,
    path = "/communities/{cid}/posts/{pid}",
    tag = "posts",
    params(("cid" = i32, Path, description = "Community id"), ("pid" = i32, Path, description = "Post id")),
    responses((status = 200, description = "The post"), (status = 404, description = "No such community or post"))
)]
pub async fn get(State(state): State<CommunityState>, Path((cid, pid)): Path<(i32, i32)>) -> Result<Json<Post>, ApiError> {
    Ok(Json(scope::post(&state, cid, pid).await?))
}

#[utoipa::path(
    post,
    path = "/communities/{cid}/posts",
    tag = "posts",
    params(("cid" = i32, Path, description = "Community id")),
    request_body = crate::openapi::MessageDraftDoc,
    responses(
        (status = 201, description = "Published"),
        (status = 400, description = "Invalid post, missing community or unknown author"),
        (status = 403, description = "userLogin is not the caller"),
    )
)]
pub async fn create(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path(cid): Path<i32>,
    Json(draft): Json<PostDraft>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    if !can_create(Some(&principal), draft.user_login.as_deref()) {
        return Err(ApiError::Forbidden);
    }
    let saved = state.posts.save(draft, cid).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(
    patch,
    path = "/communities/{cid}/posts/{pid}",
    tag = "posts",
    params(("cid" = i32, Path, description = "Community id"), ("pid" = i32, Path, description = "Post id")),
    request_body = crate::openapi::MessageDraftDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Invalid patch or author change"), (status = 403, description = "Access is denied"), (status = 404, description = "Not found"))
)]
pub async fn patch(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path((cid, pid)): Path<(i32, i32)>,
    Json(draft): Json<PostDraft>,
) -> Result<Json<Post>, ApiError> {
    scope::post(&state, cid, pid).await?;
    if !state.post_access.can_patch(Some(&principal), &pid).await {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(state.posts.update(pid, draft, principal.is_admin()).await?))
}

#[utoipa::path(
    delete,
    path = "/communities/{cid}/posts/{pid}",
    tag = "posts",
    params(("cid" = i32, Path, description = "Community id"), ("pid" = i32, Path, description = "Post id")),
    responses((status = 204, description = "Deleted with comments and likes"), (status = 403, description = "Access is denied"), (status = 404, description = "Not found"))
)]
pub async fn delete(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path((cid, pid)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    scope::post(&state, cid, pid).await?;
    if !state.post_access.can_delete(Some(&principal), &pid).await {
        return Err(ApiError::Forbidden);
    }
    state.posts.delete_by_id(pid).await?;
    Ok(StatusCode::NO_CONTENT)
}
