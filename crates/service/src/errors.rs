use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::resilience::{BreakerOpen, TripsBreaker};

/// Domain failures surfaced by every service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Rejected write: failed validation, missing referenced entity or conflict.
    #[error("{0}")]
    IllegalModification(String),
    #[error("{0}")]
    NotFound(String),
    /// Database, remote service or open circuit.
    #[error("{0}")]
    RemoteUnavailable(String),
}

impl ServiceError {
    pub fn illegal(msg: impl Into<String>) -> Self { Self::IllegalModification(msg.into()) }
    pub fn not_found(msg: impl Into<String>) -> Self { Self::NotFound(msg.into()) }
    pub fn unavailable(msg: impl Into<String>) -> Self { Self::RemoteUnavailable(msg.into()) }
}

/// Persistence failures, classified once at the repository boundary.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// Unique or foreign-key violation.
    #[error("constraint violation: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<DbErr> for RepositoryError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => RepositoryError::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => RepositoryError::Conflict(msg),
            _ => RepositoryError::Db(e.to_string()),
        }
    }
}

impl From<BreakerOpen> for RepositoryError {
    fn from(e: BreakerOpen) -> Self { RepositoryError::Db(e.to_string()) }
}

impl TripsBreaker for RepositoryError {
    // 约束冲突是调用方的问题，不代表数据库故障
    fn trips_breaker(&self) -> bool { matches!(self, RepositoryError::Db(_)) }
}

impl RepositoryError {
    /// Translate into the service error for `area` ("Community", "User", ...).
    /// A conflict becomes `conflict_msg` when given, an infrastructure failure
    /// becomes "<area> database unavailable".
    pub fn into_service(self, area: &str, conflict_msg: Option<String>) -> ServiceError {
        match (self, conflict_msg) {
            (RepositoryError::Conflict(_), Some(msg)) => ServiceError::IllegalModification(msg),
            _ => ServiceError::RemoteUnavailable(format!("{area} database unavailable")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_maps_to_illegal_modification_only_with_message() {
        let e = RepositoryError::Conflict("uniq".into());
        assert_eq!(
            e.clone().into_service("Community", Some("Such a community already exists: a".into())),
            ServiceError::illegal("Such a community already exists: a")
        );
        assert_eq!(e.into_service("Community", None), ServiceError::unavailable("Community database unavailable"));
    }

    #[test]
    fn db_error_trips_breaker_conflict_does_not() {
        assert!(RepositoryError::Db("io".into()).trips_breaker());
        assert!(!RepositoryError::Conflict("uniq".into()).trips_breaker());
    }
}
