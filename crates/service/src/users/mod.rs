//! User accounts: domain, repository (trait, SeaORM, mock) and service.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::UserService;
