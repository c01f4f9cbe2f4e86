//! Lookup of user logins in user-service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::domain::{Principal, Role};
use crate::auth::token::TokenService;
use crate::errors::ServiceError;
use crate::resilience::{BreakerOpen, CircuitBreaker, TripsBreaker};

/// Login under which community-service calls user-service.
pub const SERVICE_LOGIN: &str = "community-service";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    pub login: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("no user with login {0}")]
    NotFound(String),
    /// user-service refused our credentials (401 / 403).
    #[error("user-service rejected credentials: {0}")]
    Rejected(u16),
    #[error("user-service unavailable: {0}")]
    Unavailable(String),
}

impl From<BreakerOpen> for RemoteError {
    fn from(e: BreakerOpen) -> Self { RemoteError::Unavailable(e.to_string()) }
}

impl TripsBreaker for RemoteError {
    fn trips_breaker(&self) -> bool { !matches!(self, RemoteError::NotFound(_)) }
}

impl From<RemoteError> for ServiceError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::NotFound(login) => ServiceError::illegal(format!("User not found: {login}")),
            RemoteError::Rejected(_) => ServiceError::unavailable("Auth service unavailable"),
            RemoteError::Unavailable(_) => ServiceError::unavailable("User microservice unavailable"),
        }
    }
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, login: &str) -> Result<RemoteUser, RemoteError>;
}

/// Fails with IllegalModification when the login is unknown to user-service.
pub(crate) async fn require_user(
    breaker: &CircuitBreaker,
    users: &dyn UserDirectory,
    login: &str,
) -> Result<RemoteUser, ServiceError> {
    breaker.call(users.find_user(login)).await.map_err(|e| {
        if !matches!(e, RemoteError::NotFound(_)) {
            warn!(login, error = %e, "user lookup failed");
        }
        ServiceError::from(e)
    })
}

/// `GET {base_url}/users?login=` with a bearer token signed for [`SERVICE_LOGIN`].
pub struct HttpUserDirectory {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenService>,
}

impl HttpUserDirectory {
    pub fn new(base_url: impl Into<String>, timeout: Duration, tokens: Arc<TokenService>) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        Ok(Self { client, base_url: base_url.into(), tokens })
    }

    pub fn from_config(cfg: &configs::UserServiceConfig, tokens: Arc<TokenService>) -> Result<Self, RemoteError> {
        Self::new(cfg.base_url.clone(), cfg.timeout(), tokens)
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn find_user(&self, login: &str) -> Result<RemoteUser, RemoteError> {
        let token = self
            .tokens
            .issue(&Principal::new(SERVICE_LOGIN, Role::User))
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        let resp = self
            .client
            .get(format!("{}/users", self.base_url))
            .query(&[("login", login)])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;

        let status = resp.status();
        debug!(login, %status, "user-service responded");
        match status {
            s if s.is_success() => resp.json::<RemoteUser>().await.map_err(|e| RemoteError::Unavailable(e.to_string())),
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound(login.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RemoteError::Rejected(status.as_u16())),
            other => Err(RemoteError::Unavailable(format!("status {other}"))),
        }
    }
}

/// In-memory directory for tests and doc examples.
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct StaticUserDirectory {
        logins: Mutex<HashSet<String>>,
        down: AtomicBool,
    }

    impl StaticUserDirectory {
        pub fn with_users<I, S>(logins: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self { logins: Mutex::new(logins.into_iter().map(Into::into).collect()), down: AtomicBool::new(false) }
        }

        pub fn add(&self, login: &str) { self.logins.lock().unwrap().insert(login.to_string()); }

        /// Simulate user-service being unreachable.
        pub fn set_down(&self, down: bool) { self.down.store(down, Ordering::SeqCst); }
    }

    #[async_trait]
    impl UserDirectory for StaticUserDirectory {
        async fn find_user(&self, login: &str) -> Result<RemoteUser, RemoteError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(RemoteError::Unavailable("connection refused".into()));
            }
            if self.logins.lock().unwrap().contains(login) {
                Ok(RemoteUser { login: login.to_string(), email: None, role: None })
            } else {
                Err(RemoteError::NotFound(login.to_string()))
            }
        }
    }
}
