//! Likes on posts and on comments. Creation is self-or-ADMIN, deletion goes
//! through the like's owner.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use service::access::can_create;
use service::auth::domain::Principal;
use service::community::domain::{CommentLike, LikeDraft, PostLike};

use super::scope;
use crate::errors::{ApiError, OrNotFound};
use crate::state::CommunityState;

#[utoipa::path(
    get,
    path = "/communities/{cid}/posts/{pid}/likes",
    tag = "likes",
    params(("cid" = i32, Path, description = "Community id"), ("pid" = i32, Path, description = "Post id")),
    responses((status = 200, description = "Likes of the post"), (status = 404, description = "Not found"))
)]
pub async fn list_post_likes(
    State(state): State<CommunityState>,
    Path((cid, pid)): Path<(i32, i32)>,
) -> Result<Json<Vec<PostLike>>, ApiError> {
    scope::post(&state, cid, pid).await?;
    Ok(Json(state.post_likes.find_all_by_post_id(pid).await?))
}

#[utoipa::path(
    get,
    path = "/communities/{cid}/posts/{pid}/likes/{like_id}",
    tag = "likes",
    params(
        ("cid" = i32, Path, description = "Community id"),
        ("pid" = i32, Path, description = "Post id"),
        ("like_id" = i32, Path, description = "Like id"),
    ),
    responses((status = 200, description = "The like"), (status = 404, description = "Not found"))
)]
pub async fn get_post_like(
    State(state): State<CommunityState>,
    Path((cid, pid, like_id)): Path<(i32, i32, i32)>,
) -> Result<Json<PostLike>, ApiError> {
    Ok(Json(post_like_in(&state, cid, pid, like_id).await?))
}

#[utoipa::path(
    post,
    path = "/communities/{cid}/posts/{pid}/likes",
    tag = "likes",
    params(("cid" = i32, Path, description = "Community id"), ("pid" = i32, Path, description = "Post id")),
    request_body = crate::openapi::LikeDraftDoc,
    responses(
        (status = 201, description = "Liked"),
        (status = 400, description = "Duplicate like, missing post or unknown user"),
        (status = 403, description = "userLogin is not the caller"),
    )
)]
pub async fn create_post_like(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path((cid, pid)): Path<(i32, i32)>,
    Json(draft): Json<LikeDraft>,
) -> Result<(StatusCode, Json<PostLike>), ApiError> {
    scope::post_parent(&state, cid, pid).await?;
    if !can_create(Some(&principal), draft.user_login.as_deref()) {
        return Err(ApiError::Forbidden);
    }
    let saved = state.post_likes.save(draft, pid).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(
    delete,
    path = "/communities/{cid}/posts/{pid}/likes/{like_id}",
    tag = "likes",
    params(
        ("cid" = i32, Path, description = "Community id"),
        ("pid" = i32, Path, description = "Post id"),
        ("like_id" = i32, Path, description = "Like id"),
    ),
    responses((status = 204, description = "Removed"), (status = 403, description = "Access is denied"), (status = 404, description = "Not found"))
)]
pub async fn delete_post_like(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path((cid, pid, like_id)): Path<(i32, i32, i32)>,
) -> Result<StatusCode, ApiError> {
    post_like_in(&state, cid, pid, like_id).await?;
    if !state.post_like_access.can_delete(Some(&principal), &like_id).await {
        return Err(ApiError::Forbidden);
    }
    state.post_likes.delete_by_id(like_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/communities/{cid}/posts/{pid}/comments/{comment_id}/likes",
    tag = "likes",
    params(
        ("cid" = i32, Path, description = "Community id"),
        ("pid" = i32, Path, description = "Post id"),
        ("comment_id" = i32, Path, description = "Comment id"),
    ),
    responses((status = 200, description = "Likes of the comment"), (status = 404, description = "Not found"))
)]
pub async fn list_comment_likes(
    State(state): State<CommunityState>,
    Path((cid, pid, comment_id)): Path<(i32, i32, i32)>,
) -> Result<Json<Vec<CommentLike>>, ApiError> {
    scope::comment(&state, cid, pid, comment_id).await?;
    Ok(Json(state.comment_likes.find_all_by_comment_id(comment_id).await?))
}

#[utoipa::path(
    get,
    path = "/communities/{cid}/posts/{pid}/comments/{comment_id}/likes/{like_id}",
    tag = "likes",
    params(
        ("cid" = i32, Path, description = "Community id"),
        ("pid" = i32, Path, description = "Post id"),
        ("comment_id" = i32, Path, description = "Comment id"),
        ("like_id" = i32, Path, description = "Like id"),
    ),
    responses((status = 200, description = "The like"), (status = 404, description = "Not found"))
)]
pub async fn get_comment_like(
    State(state): State<CommunityState>,
    Path((cid, pid, comment_id, like_id)): Path<(i32, i32, i32, i32)>,
) -> Result<Json<CommentLike>, ApiError> {
    Ok(Json(comment_like_in(&state, cid, pid, comment_id, like_id).await?))
}

#[utoipa::path(
    post,
    path = "/communities/{cid}/posts/{pid}/comments/{comment_id}/likes",
    tag = "likes",
    params(
        ("cid" = i32, Path, description = "Community id"),
        ("pid" = i32, Path, description = "Post id"),
        ("comment_id" = i32, Path, description = "Comment id"),
    ),
    request_body = crate::openapi::LikeDraftDoc,
    responses(
        (status = 201, description = "Liked"),
        (status = 400, description = "Duplicate like, missing comment or unknown user"),
        (status = 403, description = "userLogin is not the caller"),
    )
)]
pub async fn create_comment_like(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path((cid, pid, comment_id)): Path<(i32, i32, i32)>,
    Json(draft): Json<LikeDraft>,
) -> Result<(StatusCode, Json<CommentLike>), ApiError> {
    scope::comment_parent(&state, cid, pid, comment_id).await?;
    if !can_create(Some(&principal), draft.user_login.as_deref()) {
        return Err(ApiError::Forbidden);
    }
    let saved = state.comment_likes.save(draft, comment_id).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(
    delete,
    path = "/communities/{cid}/posts/{pid}/comments/{comment_id}/likes/{like_id}",
    tag = "likes",
    params(
        ("cid" = i32, Path, description = "Community id"),
        ("pid" = i32, Path, description = "Post id"),
        ("comment_id" = i32, Path, description = "Comment id"),
        ("like_id" = i32, Path, description = "Like id"),
    ),
    responses((status = 204, description = "Removed"), (status = 403, description = "Access is denied"), (status = 404, description = "Not found"))
)]
pub async fn delete_comment_like(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path((cid, pid, comment_id, like_id)): Path<(i32, i32, i32, i32)>,
) -> Result<StatusCode, ApiError> {
    comment_like_in(&state, cid, pid, comment_id, like_id).await?;
    if !state.comment_like_access.can_delete(Some(&principal), &like_id).await {
        return Err(ApiError::Forbidden);
    }
    state.comment_likes.delete_by_id(like_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn post_like_in(state: &CommunityState, cid: i32, pid: i32, like_id: i32) -> Result<PostLike, ApiError> {
    scope::post(state, cid, pid).await?;
    state
        .post_likes
        .find_by_id(like_id)
        .await?
        .filter(|l| l.post_id == pid)
        .or_not_found(|| format!("No like with ID {like_id}"))
}

async fn comment_like_in(
    state: &CommunityState,
    cid: i32,
    pid: i32,
    comment_id: i32,
    like_id: i32,
) -> Result<CommentLike, ApiError> {
    scope::comment(state, cid, pid, comment_id).await?;
    state
        .comment_likes
        .find_by_id(like_id)
        .await?
        .filter(|l| l.comment_id == comment_id)
        .or_not_found(|| format!("No like with ID {like_id}"))
}
