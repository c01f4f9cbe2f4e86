use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use super::domain::{Community, CommunityDraft};
use super::remote::{require_user, UserDirectory};
use super::repository::CommunityRepository;
use crate::access::OwnerLookup;
use crate::errors::{RepositoryError, ServiceError};
use crate::resilience::CircuitBreaker;
use crate::validation::CopyNonNull;

const AREA: &str = "Community";

pub struct CommunityService<R: CommunityRepository> {
    repo: Arc<R>,
    users: Arc<dyn UserDirectory>,
    breaker: CircuitBreaker,
}

impl<R: CommunityRepository> CommunityService<R> {
    pub fn new(repo: Arc<R>, users: Arc<dyn UserDirectory>, breaker: CircuitBreaker) -> Self {
        Self { repo, users, breaker }
    }

    /// Communities ordered by member count, largest first; ties by id.
    pub async fn find_all(&self) -> Result<Vec<Community>, ServiceError> {
        let mut rows = self.guarded(self.repo.find_communities()).await?;
        rows.sort_by_key(|(c, members)| (Reverse(*members), c.id));
        Ok(rows.into_iter().map(|(c, _)| c).collect())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Community>, ServiceError> {
        self.guarded(self.repo.find_community(id)).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Community>, ServiceError> {
        self.guarded(self.repo.find_community_by_name(name)).await
    }

    /// Create a community. The admin login must exist in user-service.
    ///
    /// # Examples
    /// ```
    /// use service::community::{CommunityService, domain::CommunityDraft};
    /// use service::community::repository::mock::MockCommunityRepository;
    /// use service::community::remote::mock::StaticUserDirectory;
    /// use service::resilience::CircuitBreaker;
    /// use std::sync::Arc;
    /// let svc = CommunityService::new(
    ///     Arc::new(MockCommunityRepository::default()),
    ///     Arc::new(StaticUserDirectory::with_users(["alice"])),
    ///     CircuitBreaker::pass_through(),
    /// );
    /// let draft = CommunityDraft {
    ///     name: Some("rustaceans".into()),
    ///     description: Some("all things rust".into()),
    ///     admin_login: Some("alice".into()),
    /// };
    /// let c = tokio_test::block_on(svc.save(draft)).unwrap();
    /// assert_eq!(c.admin_login, "alice");
    /// ```
    #[instrument(skip(self, draft), fields(name = ?draft.name))]
    pub async fn save(&self, draft: CommunityDraft) -> Result<Community, ServiceError> {
        let data = draft.validated()?;
        require_user(&self.breaker, self.users.as_ref(), &data.admin_login).await?;
        let name = data.name.clone();
        let saved = self
            .breaker
            .call(self.repo.insert_community(data))
            .await
            .map_err(|e| e.into_service(AREA, Some(format!("Such a community already exists: {name}"))))?;
        info!(id = saved.id, name = %saved.name, "community_saved");
        Ok(saved)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i32, patch: CommunityDraft) -> Result<Community, ServiceError> {
        let stored = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No community with ID {id}")))?;
        let mut draft = CommunityDraft::from(&stored);
        draft.copy_non_null(patch);
        let data = draft.validated()?;
        if data.admin_login != stored.admin_login {
            require_user(&self.breaker, self.users.as_ref(), &data.admin_login).await?;
        }
        let name = data.name.clone();
        let updated = self
            .breaker
            .call(self.repo.update_community(id, data))
            .await
            .map_err(|e| e.into_service(AREA, Some(format!("Such a community already exists: {name}"))))?;
        info!(id, "community_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        if !self.guarded(self.repo.delete_community(id)).await? {
            return Err(ServiceError::not_found(format!("No community with ID {id}")));
        }
        info!(id, "community_deleted");
        Ok(())
    }

    async fn guarded<T>(
        &self,
        op: impl std::future::Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, ServiceError> {
        self.breaker.call(op).await.map_err(|e| e.into_service(AREA, None))
    }
}

#[async_trait]
impl<R: CommunityRepository> OwnerLookup for CommunityService<R> {
    type Id = i32;

    async fn owner_login(&self, id: &i32) -> Result<Option<String>, ServiceError> {
        Ok(self.find_by_id(*id).await?.map(|c| c.admin_login))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::remote::mock::StaticUserDirectory;
    use crate::community::repository::mock::MockCommunityRepository;

    struct Fixture {
        repo: Arc<MockCommunityRepository>,
        users: Arc<StaticUserDirectory>,
        svc: CommunityService<MockCommunityRepository>,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MockCommunityRepository::default());
        let users = Arc::new(StaticUserDirectory::with_users(["alice", "bob"]));
        let svc = CommunityService::new(repo.clone(), users.clone(), CircuitBreaker::pass_through());
        Fixture { repo, users, svc }
    }

    fn draft(name: &str, admin: &str) -> CommunityDraft {
        CommunityDraft { name: Some(name.into()), description: Some("about".into()), admin_login: Some(admin.into()) }
    }

    #[tokio::test]
    async fn find_all_orders_by_member_count_then_id() {
        let f = fixture();
        let a = f.svc.save(draft("a", "alice")).await.unwrap();
        let b = f.svc.save(draft("b", "alice")).await.unwrap();
        let c = f.svc.save(draft("c", "alice")).await.unwrap();
        f.repo.subscribe(b.id, "bob").await.unwrap();
        f.repo.subscribe(b.id, "alice").await.unwrap();
        f.repo.subscribe(c.id, "bob").await.unwrap();

        let ids: Vec<i32> = f.svc.find_all().await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![b.id, c.id, a.id]);
    }

    #[tokio::test]
    async fn empty_draft_is_rejected_with_three_messages() {
        let f = fixture();
        let err = f.svc.save(CommunityDraft::default()).await.unwrap_err();
        assert_eq!(err, ServiceError::illegal("name is mandatory, description is mandatory, admin login is mandatory"));
    }

    #[tokio::test]
    async fn unknown_admin_is_illegal_modification() {
        let f = fixture();
        let err = f.svc.save(draft("x", "ghost")).await.unwrap_err();
        assert_eq!(err, ServiceError::illegal("User not found: ghost"));

        // 在 user-service 注册后即可成为管理员
        f.users.add("ghost");
        assert_eq!(f.svc.save(draft("x", "ghost")).await.unwrap().admin_login, "ghost");
    }

    #[tokio::test]
    async fn user_service_outage_is_remote_unavailable() {
        let f = fixture();
        f.users.set_down(true);
        let err = f.svc.save(draft("x", "alice")).await.unwrap_err();
        assert_eq!(err, ServiceError::unavailable("User microservice unavailable"));
    }

    #[tokio::test]
    async fn duplicate_name_is_illegal_modification() {
        let f = fixture();
        f.svc.save(draft("dup", "alice")).await.unwrap();
        let err = f.svc.save(draft("dup", "bob")).await.unwrap_err();
        assert_eq!(err, ServiceError::illegal("Such a community already exists: dup"));
    }

    #[tokio::test]
    async fn update_merges_patch_and_checks_new_admin() {
        let f = fixture();
        let c = f.svc.save(draft("n", "alice")).await.unwrap();
        let patched = f
            .svc
            .update(c.id, CommunityDraft { description: Some("new".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(patched.name, "n");
        assert_eq!(patched.description, "new");

        let err = f
            .svc
            .update(c.id, CommunityDraft { admin_login: Some("ghost".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::illegal("User not found: ghost"));
    }

    #[tokio::test]
    async fn saved_community_is_found_until_deleted() {
        let f = fixture();
        let saved = f.svc.save(draft("kept", "alice")).await.unwrap();
        assert_eq!(f.svc.find_by_id(saved.id).await.unwrap(), Some(saved.clone()));
        assert_eq!(f.svc.find_by_name("kept").await.unwrap(), Some(saved.clone()));

        f.svc.delete_by_id(saved.id).await.unwrap();
        assert!(f.svc.find_by_id(saved.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_community_are_not_found() {
        let f = fixture();
        assert_eq!(
            f.svc.update(404, CommunityDraft::default()).await.unwrap_err(),
            ServiceError::not_found("No community with ID 404")
        );
        assert_eq!(f.svc.delete_by_id(404).await.unwrap_err(), ServiceError::not_found("No community with ID 404"));
    }

    #[tokio::test]
    async fn database_outage_is_remote_unavailable() {
        let f = fixture();
        f.repo.set_down(true);
        assert_eq!(f.svc.find_all().await.unwrap_err(), ServiceError::unavailable("Community database unavailable"));
    }

    #[tokio::test]
    async fn open_circuit_fails_fast_as_unavailable() {
        let repo = Arc::new(MockCommunityRepository::default());
        let breaker = CircuitBreaker::stateful(configs::BreakerThresholds {
            failure_threshold: 1,
            recovery_timeout: std::time::Duration::from_secs(60),
            half_open_max_calls: 1,
        });
        let svc = CommunityService::new(repo.clone(), Arc::new(StaticUserDirectory::default()), breaker);
        repo.set_down(true);
        assert!(svc.find_by_id(1).await.is_err());
        repo.set_down(false);
        // the database is back, but the circuit is still open
        assert_eq!(svc.find_by_id(1).await.unwrap_err(), ServiceError::unavailable("Community database unavailable"));
    }
}
