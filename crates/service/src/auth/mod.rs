//! Auth module: roles and principals, password hashing, token issuance and the login workflow.
//!
//! Credentials live in user-service's `user_account` table, read through
//! [`crate::users::repository::UserRepository`].

pub mod domain;
pub mod errors;
pub mod password;
pub mod token;
pub mod service;

pub use domain::{Principal, Role};
pub use service::AuthService;
pub use token::TokenService;
