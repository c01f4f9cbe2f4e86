use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use super::domain::{chronological, Comment, CommentDraft};
use super::repository::CommunityRepository;
use super::{check_author_change, not_a_member};
use crate::access::OwnerLookup;
use crate::errors::{RepositoryError, ServiceError};
use crate::resilience::CircuitBreaker;
use crate::validation::CopyNonNull;

const AREA: &str = "Comment";

pub struct CommentService<R: CommunityRepository> {
    repo: Arc<R>,
    breaker: CircuitBreaker,
}

impl<R: CommunityRepository> CommentService<R> {
    pub fn new(repo: Arc<R>, breaker: CircuitBreaker) -> Self { Self { repo, breaker } }

    pub async fn find_all_by_post_id(&self, post_id: i32) -> Result<Vec<Comment>, ServiceError> {
        if self.guarded(self.repo.find_post(post_id)).await?.is_none() {
            return Err(ServiceError::not_found(format!("No post with ID {post_id}")));
        }
        let mut comments = self.guarded(self.repo.find_comments(post_id)).await?;
        chronological(&mut comments, |c| (c.created_at, c.id));
        Ok(comments)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Comment>, ServiceError> {
        self.guarded(self.repo.find_comment(id)).await
    }

    #[instrument(skip(self, draft), fields(user = ?draft.user_login))]
    pub async fn save(&self, draft: CommentDraft, post_id: i32) -> Result<Comment, ServiceError> {
        let data = draft.validated_comment()?;
        let post = self
            .guarded(self.repo.find_post(post_id))
            .await?
            .ok_or_else(|| ServiceError::illegal(format!("No post with ID {post_id}")))?;
        self.require_member(post.community_id, &data.user_login).await?;
        let saved = self.guarded(self.repo.insert_comment(post_id, data)).await?;
        info!(id = saved.id, post_id, "comment_saved");
        Ok(saved)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i32, patch: CommentDraft, privileged: bool) -> Result<Comment, ServiceError> {
        let stored = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No comment with ID {id}")))?;
        check_author_change(&stored.user_login, patch.user_login.as_deref(), privileged)?;
        let post = self
            .guarded(self.repo.find_post(stored.post_id))
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No post with ID {}", stored.post_id)))?;
        let mut draft = CommentDraft::from(&stored);
        draft.copy_non_null(patch);
        let data = draft.validated_comment()?;
        self.require_member(post.community_id, &data.user_login).await?;
        let updated = self.guarded(self.repo.update_comment(id, data)).await?;
        info!(id, "comment_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        if !self.guarded(self.repo.delete_comment(id)).await? {
            return Err(ServiceError::not_found(format!("No comment with ID {id}")));
        }
        info!(id, "comment_deleted");
        Ok(())
    }

    async fn require_member(&self, community_id: i32, login: &str) -> Result<(), ServiceError> {
        if self.guarded(self.repo.is_member(community_id, login)).await? {
            Ok(())
        } else {
            Err(not_a_member(login, community_id))
        }
    }

    async fn guarded<T>(
        &self,
        op: impl std::future::Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, ServiceError> {
        self.breaker.call(op).await.map_err(|e| e.into_service(AREA, None))
    }
}

#[async_trait]
impl<R: CommunityRepository> OwnerLookup for CommentService<R> {
    type Id = i32;

    async fn owner_login(&self, id: &i32) -> Result<Option<String>, ServiceError> {
        Ok(self.find_by_id(*id).await?.map(|c| c.user_login))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::domain::{CommunityData, PostData};
    use crate::community::repository::mock::MockCommunityRepository;

    async fn fixture() -> (Arc<MockCommunityRepository>, CommentService<MockCommunityRepository>, i32) {
        // bob is subscribed to the post's community; carol only to another one
        let repo = Arc::new(MockCommunityRepository::default());
        let c = repo
            .insert_community(CommunityData { name: "c".into(), description: "d".into(), admin_login: "alice".into() })
            .await
            .unwrap();
        repo.subscribe(c.id, "bob").await.unwrap();
        let other = repo
            .insert_community(CommunityData { name: "o".into(), description: "d".into(), admin_login: "alice".into() })
            .await
            .unwrap();
        repo.subscribe(other.id, "carol").await.unwrap();
        let p = repo.insert_post(c.id, PostData { message: "p".into(), user_login: "bob".into() }).await.unwrap();
        (repo.clone(), CommentService::new(repo, CircuitBreaker::pass_through()), p.id)
    }

    fn draft(msg: &str, user: &str) -> CommentDraft {
        CommentDraft { message: Some(msg.into()), user_login: Some(user.into()) }
    }

    #[tokio::test]
    async fn save_list_update_delete() {
        let (_, svc, pid) = fixture().await;
        let c = svc.save(draft("first", "bob"), pid).await.unwrap();
        svc.save(draft("second", "bob"), pid).await.unwrap();
        let msgs: Vec<String> = svc.find_all_by_post_id(pid).await.unwrap().into_iter().map(|c| c.message).collect();
        assert_eq!(msgs, vec!["first", "second"]);

        let u = svc.update(c.id, CommentDraft { message: Some("edited".into()), user_login: None }, false).await.unwrap();
        assert_eq!(u.message, "edited");
        assert_eq!(u.post_id, pid);

        svc.delete_by_id(c.id).await.unwrap();
        assert!(svc.find_by_id(c.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_post_and_unknown_author() {
        let (_, svc, pid) = fixture().await;
        assert_eq!(svc.find_all_by_post_id(999).await.unwrap_err(), ServiceError::not_found("No post with ID 999"));
        assert_eq!(svc.save(draft("x", "bob"), 999).await.unwrap_err(), ServiceError::illegal("No post with ID 999"));
        assert_eq!(svc.update(999, CommentDraft::default(), false).await.unwrap_err(), ServiceError::not_found("No comment with ID 999"));
    }

    #[tokio::test]
    async fn author_must_belong_to_the_posts_community() {
        let (repo, svc, pid) = fixture().await;
        let cid = repo.find_post(pid).await.unwrap().unwrap().community_id;
        assert_eq!(svc.save(draft("x", "ghost"), pid).await.unwrap_err(), not_a_member("ghost", cid));
        assert_eq!(svc.save(draft("x", "carol"), pid).await.unwrap_err(), not_a_member("carol", cid));
    }

    #[tokio::test]
    async fn author_change_needs_privilege() {
        let (repo, svc, pid) = fixture().await;
        let cid = repo.find_post(pid).await.unwrap().unwrap().community_id;
        repo.subscribe(cid, "amy").await.unwrap();
        let c = svc.save(draft("mine", "bob"), pid).await.unwrap();
        let to_amy = || CommentDraft { message: None, user_login: Some("amy".into()) };

        assert_eq!(svc.update(c.id, to_amy(), false).await.unwrap_err(), ServiceError::illegal("User can not be changed"));
        assert_eq!(svc.find_by_id(c.id).await.unwrap().unwrap().user_login, "bob");
        assert_eq!(svc.update(c.id, to_amy(), true).await.unwrap().user_login, "amy");
    }

    #[tokio::test]
    async fn outage_is_reported_per_area() {
        let (repo, svc, pid) = fixture().await;
        repo.set_down(true);
        assert_eq!(svc.find_all_by_post_id(pid).await.unwrap_err(), ServiceError::unavailable("Comment database unavailable"));
    }
}
