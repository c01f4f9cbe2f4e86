use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::domain::{AuthSession, LoginInput, Principal};
use super::errors::AuthError;
use super::password::verify_password;
use super::token::TokenService;
use crate::resilience::CircuitBreaker;
use crate::users::repository::UserRepository;

/// Auth business service independent of web framework
pub struct AuthService<R: UserRepository> {
    repo: Arc<R>,
    tokens: Arc<TokenService>,
    breaker: CircuitBreaker,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>, breaker: CircuitBreaker) -> Self {
        Self { repo, tokens, breaker }
    }

    /// Authenticate a user and issue a bearer token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, TokenService, domain::LoginInput};
    /// use service::users::{UserService, domain::UserDraft, repository::mock::MockUserRepository};
    /// use service::resilience::CircuitBreaker;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockUserRepository::default());
    /// let users = UserService::new(repo.clone(), CircuitBreaker::pass_through());
    /// let draft = UserDraft {
    ///     login: Some("u1".into()),
    ///     email: Some("u1@example.com".into()),
    ///     password: Some("Passw0rd".into()),
    ///     name: Some("U".into()),
    ///     phone: Some("+1".into()),
    ///     birthday: chrono::NaiveDate::from_ymd_opt(2000, 1, 1),
    ///     ..Default::default()
    /// };
    /// tokio_test::block_on(users.save(draft, false)).unwrap();
    /// let auth = AuthService::new(repo, Arc::new(TokenService::new("secret", 3600)), CircuitBreaker::pass_through());
    /// let session = tokio_test::block_on(auth.login(LoginInput { login: "u1".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.login, "u1");
    /// assert_eq!(session.token_type, "Bearer");
    /// ```
    #[instrument(skip(self, input), fields(login = %input.login))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self
            .breaker
            .call(self.repo.find_by_login(&input.login))
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            debug!("password mismatch");
            return Err(AuthError::Unauthorized);
        }
        if user.is_blocked {
            return Err(AuthError::Blocked);
        }

        let principal = Principal::new(user.login.clone(), user.role);
        let token = self.tokens.issue(&principal)?;
        info!(login = %user.login, role = %user.role, "user_logged_in");
        Ok(AuthSession {
            token,
            token_type: "Bearer".into(),
            expires_in: self.tokens.ttl_secs(),
            login: user.login,
            role: user.role,
        })
    }

    /// Resolve a bearer token to its principal.
    pub fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        self.tokens.verify(token)
    }
}
