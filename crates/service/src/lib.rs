//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access (repository traits with SeaORM and in-memory implementations).
//! - Explicit validation, non-null merge for partial updates, uniform error translation.
//! - Every repository and remote call goes through an injected circuit-breaker policy.

pub mod errors;
pub mod validation;
pub mod resilience;
pub mod access;
pub mod auth;
pub mod users;
pub mod community;
#[cfg(test)]
pub mod test_support;
