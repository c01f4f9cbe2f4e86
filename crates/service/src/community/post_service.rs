use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use super::domain::{chronological, Post, PostDraft};
use super::repository::CommunityRepository;
use super::{check_author_change, not_a_member};
use crate::access::OwnerLookup;
use crate::errors::{RepositoryError, ServiceError};
use crate::resilience::CircuitBreaker;
use crate::validation::CopyNonNull;

const AREA: &str = "Post";

pub struct PostService<R: CommunityRepository> {
    repo: Arc<R>,
    breaker: CircuitBreaker,
}

impl<R: CommunityRepository> PostService<R> {
    pub fn new(repo: Arc<R>, breaker: CircuitBreaker) -> Self { Self { repo, breaker } }

    /// Posts of a community, oldest first. NotFound when the community is absent.
    pub async fn find_all_by_community_id(&self, community_id: i32) -> Result<Vec<Post>, ServiceError> {
        if self.guarded(self.repo.find_community(community_id)).await?.is_none() {
            return Err(ServiceError::not_found(format!("No community with ID {community_id}")));
        }
        let mut posts = self.guarded(self.repo.find_posts(community_id)).await?;
        chronological(&mut posts, |p| (p.created_at, p.id));
        Ok(posts)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Post>, ServiceError> {
        self.guarded(self.repo.find_post(id)).await
    }

    /// Publish a post. The author must be a member of the community.
    ///
    /// # Examples
    /// ```
    /// use service::community::{PostService, domain::{CommunityData, PostDraft}};
    /// use service::community::repository::{CommunityRepository, mock::MockCommunityRepository};
    /// use service::resilience::CircuitBreaker;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockCommunityRepository::default());
    /// let c = tokio_test::block_on(repo.insert_community(CommunityData {
    ///     name: "c".into(), description: "d".into(), admin_login: "alice".into(),
    /// })).unwrap();
    /// tokio_test::block_on(repo.subscribe(c.id, "bob")).unwrap();
    /// let svc = PostService::new(repo, CircuitBreaker::pass_through());
    /// let draft = PostDraft { message: Some("hello".into()), user_login: Some("bob".into()) };
    /// let post = tokio_test::block_on(svc.save(draft, c.id)).unwrap();
    /// assert_eq!(post.community_id, c.id);
    /// ```
    #[instrument(skip(self, draft), fields(user = ?draft.user_login))]
    pub async fn save(&self, draft: PostDraft, community_id: i32) -> Result<Post, ServiceError> {
        let data = draft.validated_post()?;
        if self.guarded(self.repo.find_community(community_id)).await?.is_none() {
            return Err(ServiceError::illegal(format!("No community with ID {community_id}")));
        }
        self.require_member(community_id, &data.user_login).await?;
        let saved = self.guarded(self.repo.insert_post(community_id, data)).await?;
        info!(id = saved.id, community_id, "post_saved");
        Ok(saved)
    }

    /// Patch a post. Only a privileged caller may hand it to another author.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i32, patch: PostDraft, privileged: bool) -> Result<Post, ServiceError> {
        let stored = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No post with ID {id}")))?;
        check_author_change(&stored.user_login, patch.user_login.as_deref(), privileged)?;
        let mut draft = PostDraft::from(&stored);
        draft.copy_non_null(patch);
        let data = draft.validated_post()?;
        self.require_member(stored.community_id, &data.user_login).await?;
        let updated = self.guarded(self.repo.update_post(id, data)).await?;
        info!(id, "post_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        if !self.guarded(self.repo.delete_post(id)).await? {
            return Err(ServiceError::not_found(format!("No post with ID {id}")));
        }
        info!(id, "post_deleted");
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
impl<R: CommunityRepository> OwnerLookup for PostService<R> {
    type Id = i32;

    async fn owner_login(&self, id: &i32) -> Result<Option<String>, ServiceError> {
        Ok(self.find_by_id(*id).await?.map(|p| p.user_login))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::domain::CommunityData;
    use crate::community::repository::mock::MockCommunityRepository;

    async fn fixture() -> (Arc<MockCommunityRepository>, PostService<MockCommunityRepository>, i32) {
        let repo = Arc::new(MockCommunityRepository::default());
        let c = repo
            .insert_community(CommunityData { name: "c".into(), description: "d".into(), admin_login: "alice".into() })
            .await
            .unwrap();
        repo.subscribe(c.id, "bob").await.unwrap();
        repo.subscribe(c.id, "amy").await.unwrap();
        (repo.clone(), PostService::new(repo, CircuitBreaker::pass_through()), c.id)
    }

    fn draft(msg: &str, user: &str) -> PostDraft {
        PostDraft { message: Some(msg.into()), user_login: Some(user.into()) }
    }

    #[tokio::test]
    async fn posts_listed_in_creation_order() {
        let (_, svc, cid) = fixture().await;
        let first = svc.save(draft("one", "bob"), cid).await.unwrap();
        let second = svc.save(draft("two", "amy"), cid).await.unwrap();
        let ids: Vec<i32> = svc.find_all_by_community_id(cid).await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn read_of_missing_parent_is_not_found_write_is_illegal() {
        let (_, svc, _) = fixture().await;
        assert_eq!(svc.find_all_by_community_id(77).await.unwrap_err(), ServiceError::not_found("No community with ID 77"));
        assert_eq!(svc.save(draft("x", "bob"), 77).await.unwrap_err(), ServiceError::illegal("No community with ID 77"));
    }

    #[tokio::test]
    async fn author_must_belong_to_this_community() {
        let (repo, svc, cid) = fixture().await;
        let other = repo
            .insert_community(CommunityData { name: "o".into(), description: "d".into(), admin_login: "alice".into() })
            .await
            .unwrap();
        repo.subscribe(other.id, "carol").await.unwrap();

        assert_eq!(svc.save(draft("x", "ghost"), cid).await.unwrap_err(), not_a_member("ghost", cid));
        assert_eq!(svc.save(draft("x", "carol"), cid).await.unwrap_err(), not_a_member("carol", cid));
        assert_eq!(svc.save(draft("x", "bob"), other.id).await.unwrap_err(), not_a_member("bob", other.id));
        svc.save(draft("x", "carol"), other.id).await.unwrap();
    }

    #[tokio::test]
    async fn save_then_find_by_id_round_trips() {
        let (_, svc, cid) = fixture().await;
        let saved = svc.save(draft("hello", "bob"), cid).await.unwrap();
        assert_eq!(svc.find_by_id(saved.id).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn author_change_needs_privilege() {
        let (_, svc, cid) = fixture().await;
        let p = svc.save(draft("mine", "bob"), cid).await.unwrap();
        let to_amy = || PostDraft { message: None, user_login: Some("amy".into()) };

        assert_eq!(svc.update(p.id, to_amy(), false).await.unwrap_err(), ServiceError::illegal("User can not be changed"));
        let same = svc.update(p.id, PostDraft { message: None, user_login: Some("bob".into()) }, false).await.unwrap();
        assert_eq!(same.user_login, "bob");

        let moved = svc.update(p.id, to_amy(), true).await.unwrap();
        assert_eq!(moved.user_login, "amy");
        let err = svc.update(p.id, PostDraft { message: None, user_login: Some("ghost".into()) }, true).await.unwrap_err();
        assert_eq!(err, not_a_member("ghost", cid));
    }

    #[tokio::test]
    async fn update_patches_message_only() {
        let (_, svc, cid) = fixture().await;
        let p = svc.save(draft("before", "bob"), cid).await.unwrap();
        let u = svc.update(p.id, PostDraft { message: Some("after".into()), user_login: None }, false).await.unwrap();
        assert_eq!(u.message, "after");
        assert_eq!(u.user_login, "bob");
        assert_eq!(u.created_at, p.created_at);

        let err = svc.update(p.id, PostDraft { message: Some("".into()), user_login: None }, false).await.unwrap_err();
        assert_eq!(err, ServiceError::illegal("message is mandatory"));
    }

    #[tokio::test]
    async fn delete_cascades_and_missing_is_not_found() {
        let (repo, svc, cid) = fixture().await;
        let p = svc.save(draft("x", "bob"), cid).await.unwrap();
        repo.insert_post_like(p.id, "amy").await.unwrap();
        svc.delete_by_id(p.id).await.unwrap();
        assert!(svc.find_by_id(p.id).await.unwrap().is_none());
        assert!(repo.find_post_likes(p.id).await.unwrap().is_empty());
        assert_eq!(svc.delete_by_id(p.id).await.unwrap_err(), ServiceError::not_found(format!("No post with ID {}", p.id)));
    }

    #[tokio::test]
    async fn owner_lookup_reports_author() {
        let (_, svc, cid) = fixture().await;
        let p = svc.save(draft("x", "amy"), cid).await.unwrap();
        assert_eq!(svc.owner_login(&p.id).await.unwrap().as_deref(), Some("amy"));
        assert_eq!(svc.owner_login(&999).await.unwrap(), None);
    }
}
