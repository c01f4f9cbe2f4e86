//! Likes on posts and on comments. A user likes a given target at most once.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use super::domain::{chronological, CommentLike, LikeDraft, PostLike};
use super::not_a_member;
use super::repository::CommunityRepository;
use crate::access::OwnerLookup;
use crate::errors::{RepositoryError, ServiceError};
use crate::resilience::CircuitBreaker;

const AREA: &str = "Like";
const DUPLICATE: &str = "Such a like already exists";

async fn guarded<T>(
    breaker: &CircuitBreaker,
    op: impl std::future::Future<Output = Result<T, RepositoryError>>,
) -> Result<T, ServiceError> {
    breaker.call(op).await.map_err(|e| e.into_service(AREA, None))
}

/// The liker must be subscribed to the community that owns the post.
async fn require_member<R: CommunityRepository>(
    repo: &R,
    breaker: &CircuitBreaker,
    post_id: i32,
    login: &str,
) -> Result<(), ServiceError> {
    let post = guarded(breaker, repo.find_post(post_id))
        .await?
        .ok_or_else(|| ServiceError::illegal(format!("No post with ID {post_id}")))?;
    if guarded(breaker, repo.is_member(post.community_id, login)).await? {
        Ok(())
    } else {
        Err(not_a_member(login, post.community_id))
    }
}

fn no_like(id: i32) -> ServiceError { ServiceError::not_found(format!("No like with ID {id}")) }

pub struct PostLikeService<R: CommunityRepository> {
    repo: Arc<R>,
    breaker: CircuitBreaker,
}

impl<R: CommunityRepository> PostLikeService<R> {
    pub fn new(repo: Arc<R>, breaker: CircuitBreaker) -> Self { Self { repo, breaker } }

    pub async fn find_all_by_post_id(&self, post_id: i32) -> Result<Vec<PostLike>, ServiceError> {
        if guarded(&self.breaker, self.repo.find_post(post_id)).await?.is_none() {
            return Err(ServiceError::not_found(format!("No post with ID {post_id}")));
        }
        let mut likes = guarded(&self.breaker, self.repo.find_post_likes(post_id)).await?;
        chronological(&mut likes, |l| (l.created_at, l.id));
        Ok(likes)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<PostLike>, ServiceError> {
        guarded(&self.breaker, self.repo.find_post_like(id)).await
    }

    #[instrument(skip(self, draft), fields(user = ?draft.user_login))]
    pub async fn save(&self, draft: LikeDraft, post_id: i32) -> Result<PostLike, ServiceError> {
        let login = draft.validated()?;
        require_member(self.repo.as_ref(), &self.breaker, post_id, &login).await?;
        let existing = guarded(&self.breaker, self.repo.find_post_likes(post_id)).await?;
        if existing.iter().any(|l| l.user_login == login) {
            return Err(ServiceError::illegal(DUPLICATE));
        }
        let saved = self
            .breaker
            .call(self.repo.insert_post_like(post_id, &login))
            .await
            .map_err(|e| e.into_service(AREA, Some(DUPLICATE.to_string())))?;
        info!(id = saved.id, post_id, "post_like_saved");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        if !guarded(&self.breaker, self.repo.delete_post_like(id)).await? {
            return Err(no_like(id));
        }
        info!(id, "post_like_deleted");
        Ok(())
    }
}

#[async_trait]
impl<R: CommunityRepository> OwnerLookup for PostLikeService<R> {
    type Id = i32;

    async fn owner_login(&self, id: &i32) -> Result<Option<String>, ServiceError> {
        Ok(self.find_by_id(*id).await?.map(|l| l.user_login))
    }
}

pub struct CommentLikeService<R: CommunityRepository> {
    repo: Arc<R>,
    breaker: CircuitBreaker,
}

impl<R: CommunityRepository> CommentLikeService<R> {
    pub fn new(repo: Arc<R>, breaker: CircuitBreaker) -> Self { Self { repo, breaker } }

    pub async fn find_all_by_comment_id(&self, comment_id: i32) -> Result<Vec<CommentLike>, ServiceError> {
        if guarded(&self.breaker, self.repo.find_comment(comment_id)).await?.is_none() {
            return Err(ServiceError::not_found(format!("No comment with ID {comment_id}")));
        }
        let mut likes = guarded(&self.breaker, self.repo.find_comment_likes(comment_id)).await?;
        chronological(&mut likes, |l| (l.created_at, l.id));
        Ok(likes)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<CommentLike>, ServiceError> {
        guarded(&self.breaker, self.repo.find_comment_like(id)).await
    }

    #[instrument(skip(self, draft), fields(user = ?draft.user_login))]
    pub async fn save(&self, draft: LikeDraft, comment_id: i32) -> Result<CommentLike, ServiceError> {
        let login = draft.validated()?;
        let comment = guarded(&self.breaker, self.repo.find_comment(comment_id))
            .await?
            .ok_or_else(|| ServiceError::illegal(format!("No comment with ID {comment_id}")))?;
        require_member(self.repo.as_ref(), &self.breaker, comment.post_id, &login).await?;
        let existing = guarded(&self.breaker, self.repo.find_comment_likes(comment_id)).await?;
        if existing.iter().any(|l| l.user_login == login) {
            return Err(ServiceError::illegal(DUPLICATE));
        }
        let saved = self
            .breaker
            .call(self.repo.insert_comment_like(comment_id, &login))
            .await
            .map_err(|e| e.into_service(AREA, Some(DUPLICATE.to_string())))?;
        info!(id = saved.id, comment_id, "comment_like_saved");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        if !guarded(&self.breaker, self.repo.delete_comment_like(id)).await? {
            return Err(no_like(id));
        }
        info!(id, "comment_like_deleted");
        Ok(())
    }
}

#[async_trait]
impl<R: CommunityRepository> OwnerLookup for CommentLikeService<R> {
    type Id = i32;

    async fn owner_login(&self, id: &i32) -> Result<Option<String>, ServiceError> {
        Ok(self.find_by_id(*id).await?.map(|l| l.user_login))
    }
}
