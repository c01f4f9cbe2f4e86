use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use service::access::can_create;
use service::auth::domain::Principal;
use service::community::domain::{Comment, CommentDraft};

use super::scope;
use crate::errors::ApiError;
use crate::state::CommunityState;

#[utoipa::path(
    get,
    path = "/communities/{cid}/posts/{pid}/comments",
    tag = "comments",
    params(("cid" = i32, Path, description = "Community id"), ("pid" = i32, Path, description = "Post id")),
    responses((status = 200, description = "Comments, oldest first"), (status = 404, description = "Not found"))
)]
pub async fn list(
    State(state): State<CommunityState>,
    Path((cid, pid)): Path<(i32, i32)>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    scope::post(&state, cid, pid).await?;
    Ok(Json(state.comments.find_all_by_post_id(pid).await?))
}

#[utoipa::path(
    get,
    path = "/communities/{cid}/posts/{pid}/comments/{comment_id}",
    tag = "comments",
    params(
        ("cid" = i32, Path, description = "Community id"),
        ("pid" = i32, Path, description = "Post id"),
        ("comment_id" = i32, Path, description = "Comment id"),
    ),
    responses((status = 200, description = "The comment"), (status = 404, description = "Not found"))
)]
pub async fn get(
    State(state): State<CommunityState>,
    Path((cid, pid, comment_id)): Path<(i32, i32, i32)>,
) -> Result<Json<Comment>, ApiError> {
    Ok(Json(scope::comment(&state, cid, pid, comment_id).await?))
}

#[utoipa::path(
    post,
    path = "/communities/{cid}/posts/{pid}/comments",
    tag = "comments",
    params(("cid" = i32, Path, description = "Community id"), ("pid" = i32, Path, description = "Post id")),
    request_body = crate::openapi::MessageDraftDoc,
    responses(
        (status = 201, description = "Published"),
        (status = 400, description = "Invalid comment, missing post or unknown author"),
        (status = 403, description = "userLogin is not the caller"),
        (status = 404, description = "No such community"),
    )
)]
pub async fn create(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path((cid, pid)): Path<(i32, i32)>,
    Json(draft): Json<CommentDraft>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    scope::post_parent(&state, cid, pid).await?;
    if !can_create(Some(&principal), draft.user_login.as_deref()) {
        return Err(ApiError::Forbidden);
    }
    let saved = state.comments.save(draft, pid).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(
    patch,
    path = "/communities/{cid}/posts/{pid}/comments/{comment_id}",
    tag = "comments",
    params(
        ("cid" = i32, Path, description = "Community id"),
        ("pid" = i32, Path, description = "Post id"),
        ("comment_id" = i32, Path, description = "Comment id"),
    ),
    request_body = crate::openapi::MessageDraftDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Invalid patch or author change"), (status = 403, description = "Access is denied"), (status = 404, description = "Not found"))
)]
pub async fn patch(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path((cid, pid, comment_id)): Path<(i32, i32, i32)>,
    Json(draft): Json<CommentDraft>,
) -> Result<Json<Comment>, ApiError> {
    scope::comment(&state, cid, pid, comment_id).await?;
    if !state.comment_access.can_patch(Some(&principal), &comment_id).await {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(state.comments.update(comment_id, draft, principal.is_admin()).await?))
}

#[utoipa::path(
    delete,
    path = "/communities/{cid}/posts/{pid}/comments/{comment_id}",
    tag = "comments",
    params(
        ("cid" = i32, Path, description = "Community id"),
        ("pid" = i32, Path, description = "Post id"),
        ("comment_id" = i32, Path, description = "Comment id"),
    ),
    responses((status = 204, description = "Deleted with its likes"), (status = 403, description = "Access is denied"), (status = 404, description = "Not found"))
)]
pub async fn delete(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path((cid, pid, comment_id)): Path<(i32, i32, i32)>,
) -> Result<StatusCode, ApiError> {
    scope::comment(&state, cid, pid, comment_id).await?;
    if !state.comment_access.can_delete(Some(&principal), &comment_id).await {
        return Err(ApiError::Forbidden);
    }
    state.comments.delete_by_id(comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
