use thiserror::Error;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    Unauthorized,
    #[error("user is blocked")]
    Blocked,
    #[error("token error: {0}")]
    Token(String),
    #[error("hashing error: {0}")]
    Hash(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Unauthorized => 401,
            AuthError::Blocked => 403,
            AuthError::Token(_) => 401,
            AuthError::Hash(_) => 503,
            AuthError::Repository(_) => 503,
        }
    }
}
