use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::{info, instrument};

use super::domain::{PersonalData, User, UserDraft};
use super::repository::UserRepository;
use crate::access::OwnerLookup;
use crate::auth::domain::Role;
use crate::auth::password::hash_password;
use crate::errors::{RepositoryError, ServiceError};
use crate::resilience::CircuitBreaker;
use crate::validation::{ensure_valid, reject_violations, CopyNonNull, Validate};

const AREA: &str = "User";

/// User accounts business service independent of web framework
pub struct UserService<R: UserRepository> {
    repo: Arc<R>,
    breaker: CircuitBreaker,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: Arc<R>, breaker: CircuitBreaker) -> Self { Self { repo, breaker } }

    pub async fn find_all(&self) -> Result<Vec<User>, ServiceError> {
        self.guarded(self.repo.find_all()).await
    }

    pub async fn find_by_login(&self, login: &str) -> Result<Option<User>, ServiceError> {
        self.guarded(self.repo.find_by_login(login)).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        self.guarded(self.repo.find_by_email(email)).await
    }

    pub async fn count(&self) -> Result<u64, ServiceError> {
        self.guarded(self.repo.count()).await
    }

    /// Register a user with a hashed password. Role and blocked flag are only
    /// taken from the draft when `privileged`; otherwise the user is an
    /// unblocked USER.
    ///
    /// # Examples
    /// ```
    /// use service::users::{UserService, domain::UserDraft, repository::mock::MockUserRepository};
    /// use service::resilience::CircuitBreaker;
    /// use std::sync::Arc;
    /// let svc = UserService::new(Arc::new(MockUserRepository::default()), CircuitBreaker::pass_through());
    /// let draft = UserDraft {
    ///     login: Some("alice".into()),
    ///     email: Some("alice@example.com".into()),
    ///     password: Some("Passw0rd".into()),
    ///     name: Some("Alice".into()),
    ///     phone: Some("+100".into()),
    ///     birthday: chrono::NaiveDate::from_ymd_opt(1990, 1, 1),
    ///     ..Default::default()
    /// };
    /// let user = tokio_test::block_on(svc.save(draft, false)).unwrap();
    /// assert_eq!(user.login, "alice");
    /// assert_ne!(user.password_hash, "Passw0rd");
    /// ```
    #[instrument(skip(self, draft), fields(login = ?draft.login))]
    pub async fn save(&self, draft: UserDraft, privileged: bool) -> Result<User, ServiceError> {
        ensure_valid(&draft)?;
        let user = build_user(draft, None, privileged)?;
        let login = user.login.clone();
        let saved = self
            .breaker
            .call(self.repo.insert(user))
            .await
            .map_err(|e| e.into_service(AREA, Some(format!("Such a user already exists: {login}"))))?;
        info!(login = %saved.login, role = %saved.role, "user_saved");
        Ok(saved)
    }

    /// Apply `patch` onto the stored user. A patched password is re-hashed;
    /// role and blocked flag are ignored unless `privileged`.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, login: &str, mut patch: UserDraft, privileged: bool) -> Result<User, ServiceError> {
        let stored = self
            .find_by_login(login)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No user with login {login}")))?;
        if patch.login.as_deref().is_some_and(|l| l != login) {
            return Err(ServiceError::illegal("Login can not be changed"));
        }
        if !privileged {
            patch.role = None;
            patch.is_blocked = None;
        }

        let password_patched = patch.password.is_some();
        let taken = match patch.email.as_deref() {
            Some(email) if email != stored.email => email.to_string(),
            _ => login.to_string(),
        };
        let mut draft = UserDraft::from(&stored);
        draft.copy_non_null(patch);
        // 未修改密码时沿用已存储的哈希
        let violations = draft
            .violations()
            .into_iter()
            .filter(|v| password_patched || v.field != "password")
            .collect();
        reject_violations(violations)?;

        let user = build_user(draft, Some(&stored), true)?;
        let updated = self
            .breaker
            .call(self.repo.update(user))
            .await
            .map_err(|e| e.into_service(AREA, Some(format!("Such a user already exists: {taken}"))))?;
        info!(login = %updated.login, "user_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn set_blocked_by_login(&self, login: &str, blocked: bool) -> Result<(), ServiceError> {
        let mut user = self
            .find_by_login(login)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No user with login {login}")))?;
        user.is_blocked = blocked;
        self.guarded(self.repo.update(user)).await?;
        info!(login, blocked, "user_block_changed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_by_login(&self, login: &str) -> Result<(), ServiceError> {
        if !self.guarded(self.repo.delete_by_login(login)).await? {
            return Err(ServiceError::not_found(format!("No user with login {login}")));
        }
        info!(login, "user_deleted");
        Ok(())
    }

    /// Create the configured administrator unless the login is taken.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, admin: &configs::BootstrapAdmin) -> Result<bool, ServiceError> {
        if self.find_by_login(&admin.login).await?.is_some() {
            return Ok(false);
        }
        let draft = UserDraft {
            login: Some(admin.login.clone()),
            email: Some(admin.email.clone()),
            password: Some(admin.password.clone()),
            role: Some(Role::Admin),
            is_blocked: Some(false),
            name: Some("Administrator".into()),
            phone: Some("-".into()),
            birthday: NaiveDate::from_ymd_opt(1970, 1, 1),
        };
        self.save(draft, true).await?;
        Ok(true)
    }

    async fn guarded<T>(
        &self,
        op: impl std::future::Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, ServiceError> {
        self.breaker.call(op).await.map_err(|e| e.into_service(AREA, None))
    }
}

/// Assemble a stored user from a validated draft. `previous` supplies the
/// hash when the draft carries no password, and the creation time.
fn build_user(draft: UserDraft, previous: Option<&User>, privileged: bool) -> Result<User, ServiceError> {
    let missing = || ServiceError::illegal("incomplete user data");
    let password_hash = match (&draft.password, previous) {
        (Some(pw), _) => hash_password(pw).map_err(|e| ServiceError::unavailable(e.to_string()))?,
        (None, Some(prev)) => prev.password_hash.clone(),
        (None, None) => return Err(missing()),
    };
    Ok(User {
        login: draft.login.ok_or_else(missing)?,
        email: draft.email.ok_or_else(missing)?,
        password_hash,
        role: if privileged { draft.role.unwrap_or_default() } else { Role::User },
        is_blocked: privileged && draft.is_blocked.unwrap_or(false),
        personal_data: PersonalData {
            name: draft.name.ok_or_else(missing)?,
            phone: draft.phone.ok_or_else(missing)?,
            birthday: draft.birthday.ok_or_else(missing)?,
        },
        created_at: previous.map(|p| p.created_at).unwrap_or_else(Utc::now),
    })
}

#[async_trait]
impl<R: UserRepository> OwnerLookup for UserService<R> {
    type Id = String;

    async fn owner_login(&self, login: &String) -> Result<Option<String>, ServiceError> {
        Ok(self.find_by_login(login).await?.map(|u| u.login))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::users::repository::mock::MockUserRepository;

    fn draft(login: &str) -> UserDraft {
        UserDraft {
            login: Some(login.into()),
            email: Some(format!("{login}@example.com")),
            password: Some("Passw0rd".into()),
            name: Some("Name".into()),
            phone: Some("+1".into()),
            birthday: NaiveDate::from_ymd_opt(1991, 7, 7),
            ..Default::default()
        }
    }

    fn service() -> (Arc<MockUserRepository>, UserService<MockUserRepository>) {
        let repo = Arc::new(MockUserRepository::default());
        (repo.clone(), UserService::new(repo, CircuitBreaker::pass_through()))
    }

    #[tokio::test]
    async fn unprivileged_save_forces_plain_user() {
        let (_, svc) = service();
        let mut d = draft("eve");
        d.role = Some(Role::Admin);
        d.is_blocked = Some(true);
        let saved = svc.save(d, false).await.unwrap();
        assert_eq!(saved.role, Role::User);
        assert!(!saved.is_blocked);
        assert!(verify_password("Passw0rd", &saved.password_hash).unwrap());
    }

    #[tokio::test]
    async fn invalid_draft_lists_lowercased_messages() {
        let (_, svc) = service();
        let err = svc.save(UserDraft { login: Some("x".into()), ..Default::default() }, false).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::illegal(
                "email is mandatory, password is mandatory, name is mandatory, phone is mandatory, birthday is mandatory"
            )
        );
    }

    #[tokio::test]
    async fn duplicate_login_is_illegal_modification() {
        let (_, svc) = service();
        svc.save(draft("bob"), false).await.unwrap();
        let err = svc.save(draft("bob"), false).await.unwrap_err();
        assert_eq!(err, ServiceError::illegal("Such a user already exists: bob"));
    }

    #[tokio::test]
    async fn email_taken_by_another_user_is_named_in_conflict() {
        let (_, svc) = service();
        svc.save(draft("bob"), false).await.unwrap();
        svc.save(draft("amy"), false).await.unwrap();
        let err = svc
            .update("bob", UserDraft { email: Some("amy@example.com".into()), ..Default::default() }, false)
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::illegal("Such a user already exists: amy@example.com"));
    }

    #[tokio::test]
    async fn update_keeps_hash_unless_password_patched() {
        let (_, svc) = service();
        let saved = svc.save(draft("bob"), false).await.unwrap();

        let updated = svc
            .update("bob", UserDraft { phone: Some("+2".into()), ..Default::default() }, false)
            .await
            .unwrap();
        assert_eq!(updated.personal_data.phone, "+2");
        assert_eq!(updated.password_hash, saved.password_hash);

        let updated = svc
            .update("bob", UserDraft { password: Some("N3wPass".into()), ..Default::default() }, false)
            .await
            .unwrap();
        assert!(verify_password("N3wPass", &updated.password_hash).unwrap());
    }

    #[tokio::test]
    async fn update_rejects_blank_patch_values_and_login_change() {
        let (_, svc) = service();
        svc.save(draft("bob"), false).await.unwrap();
        let err = svc.update("bob", UserDraft { name: Some(" ".into()), ..Default::default() }, false).await.unwrap_err();
        assert_eq!(err, ServiceError::illegal("name is mandatory"));

        let err = svc.update("bob", UserDraft { login: Some("bobby".into()), ..Default::default() }, true).await.unwrap_err();
        assert_eq!(err, ServiceError::illegal("Login can not be changed"));
    }

    #[tokio::test]
    async fn unprivileged_update_cannot_escalate_role() {
        let (_, svc) = service();
        svc.save(draft("bob"), false).await.unwrap();
        let u = svc.update("bob", UserDraft { role: Some(Role::Admin), ..Default::default() }, false).await.unwrap();
        assert_eq!(u.role, Role::User);
        let u = svc.update("bob", UserDraft { role: Some(Role::Admin), ..Default::default() }, true).await.unwrap();
        assert_eq!(u.role, Role::Admin);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let (_, svc) = service();
        assert!(matches!(svc.update("ghost", UserDraft::default(), true).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.set_blocked_by_login("ghost", true).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete_by_login("ghost").await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn block_delete_and_count() {
        let (_, svc) = service();
        svc.save(draft("bob"), false).await.unwrap();
        svc.save(draft("amy"), false).await.unwrap();
        svc.set_blocked_by_login("bob", true).await.unwrap();
        assert!(svc.find_by_login("bob").await.unwrap().unwrap().is_blocked);
        assert_eq!(svc.count().await.unwrap(), 2);
        svc.delete_by_login("bob").await.unwrap();
        assert_eq!(svc.count().await.unwrap(), 1);
        assert!(svc.find_by_email("amy@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn database_outage_is_remote_unavailable() {
        let (repo, svc) = service();
        repo.set_down(true);
        assert_eq!(svc.find_all().await.unwrap_err(), ServiceError::unavailable("User database unavailable"));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let (_, svc) = service();
        let admin = configs::BootstrapAdmin { login: "root".into(), email: "root@example.com".into(), password: "R00tPass".into() };
        assert!(svc.ensure_admin(&admin).await.unwrap());
        assert!(!svc.ensure_admin(&admin).await.unwrap());
        assert_eq!(svc.find_by_login("root").await.unwrap().unwrap().role, Role::Admin);
    }
}
