use std::sync::Arc;

use tracing::{info, instrument};

use super::domain::{Member, MemberDraft};
use super::remote::{require_user, UserDirectory};
use super::repository::CommunityRepository;
use crate::errors::{RepositoryError, ServiceError};
use crate::resilience::CircuitBreaker;

const AREA: &str = "User";

/// Community membership: who belongs to which community.
pub struct MemberService<R: CommunityRepository> {
    repo: Arc<R>,
    users: Arc<dyn UserDirectory>,
    breaker: CircuitBreaker,
}

impl<R: CommunityRepository> MemberService<R> {
    pub fn new(repo: Arc<R>, users: Arc<dyn UserDirectory>, breaker: CircuitBreaker) -> Self {
        Self { repo, users, breaker }
    }

    /// Members of a community ordered by login. NotFound when the community is absent.
    pub async fn find_all_by_community_id(&self, community_id: i32) -> Result<Vec<Member>, ServiceError> {
        if self.guarded(self.repo.find_community(community_id)).await?.is_none() {
            return Err(ServiceError::not_found(format!("No community with ID {community_id}")));
        }
        let mut members = self.guarded(self.repo.find_members(community_id)).await?;
        members.sort();
        Ok(members)
    }

    #[instrument(skip(self, draft), fields(login = ?draft.login))]
    pub async fn subscribe(&self, community_id: i32, draft: MemberDraft) -> Result<Member, ServiceError> {
        let member = draft.validated()?;
        self.require_community(community_id).await?;
        require_user(&self.breaker, self.users.as_ref(), &member.login).await?;
        let already = || ServiceError::illegal(format!("User {} is already a member of community {community_id}", member.login));
        if self.guarded(self.repo.is_member(community_id, &member.login)).await? {
            return Err(already());
        }
        let saved = self
            .breaker
            .call(self.repo.subscribe(community_id, &member.login))
            .await
            .map_err(|e| e.into_service(AREA, Some(already().to_string())))?;
        info!(community_id, login = %saved.login, "member_subscribed");
        Ok(saved)
    }

    /// Leave a community. The local member row goes away with the last membership.
    #[instrument(skip(self))]
    pub async fn unsubscribe(&self, community_id: i32, login: &str) -> Result<(), ServiceError> {
        self.require_community(community_id).await?;
        let not_member = || ServiceError::illegal(format!("User {login} is not a member of community {community_id}"));
        if !self.guarded(self.repo.is_member(community_id, login)).await? {
            return Err(not_member());
        }
        if !self.guarded(self.repo.unsubscribe(community_id, login)).await? {
            return Err(not_member());
        }
        info!(community_id, login, "member_unsubscribed");
        Ok(())
    }

    async fn require_community(&self, community_id: i32) -> Result<(), ServiceError> {
        match self.guarded(self.repo.find_community(community_id)).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::illegal(format!("No community with ID {community_id}"))),
        }
    }

    async fn guarded<T>(
        &self,
        op: impl std::future::Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, ServiceError> {
        self.breaker.call(op).await.map_err(|e| e.into_service(AREA, None))
    }
}
