//! Path-ancestry checks for nested community routes. A child that exists but
//! hangs under a different parent is reported exactly like a missing one.

use service::community::domain::{Comment, Community, Post};

use crate::errors::{ApiError, OrNotFound};
use crate::state::CommunityState;

pub async fn community(state: &CommunityState, cid: i32) -> Result<Community, ApiError> {
    state
        .communities
        .find_by_id(cid)
        .await?
        .or_not_found(|| format!("No community with ID {cid}"))
}

pub async fn post(state: &CommunityState, cid: i32, pid: i32) -> Result<Post, ApiError> {
    community(state, cid).await?;
    state
        .posts
        .find_by_id(pid)
        .await?
        .filter(|p| p.community_id == cid)
        .or_not_found(|| format!("No post with ID {pid}"))
}

pub async fn comment(state: &CommunityState, cid: i32, pid: i32, comment_id: i32) -> Result<Comment, ApiError> {
    post(state, cid, pid).await?;
    state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|c| c.post_id == pid)
        .or_not_found(|| format!("No comment with ID {comment_id}"))
}

/// Before a create: the community must exist and, when the post exists, it
/// must belong to that community. A missing post is left to the service,
/// which rejects the write.
pub async fn post_parent(state: &CommunityState, cid: i32, pid: i32) -> Result<(), ApiError> {
    community(state, cid).await?;
    match state.posts.find_by_id(pid).await? {
        Some(p) if p.community_id != cid => Err(ApiError::Service(
            service::errors::ServiceError::not_found(format!("No post with ID {pid}")),
        )),
        _ => Ok(()),
    }
}

/// Same as [`post_parent`] one level down, for likes on a comment.
pub async fn comment_parent(state: &CommunityState, cid: i32, pid: i32, comment_id: i32) -> Result<(), ApiError> {
    post(state, cid, pid).await?;
    match state.comments.find_by_id(comment_id).await? {
        Some(c) if c.post_id != pid => Err(ApiError::Service(
            service::errors::ServiceError::not_found(format!("No comment with ID {comment_id}")),
        )),
        _ => Ok(()),
    }
}
