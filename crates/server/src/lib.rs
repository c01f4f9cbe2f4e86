pub mod bootstrap;
pub mod errors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod startup;
pub mod state;

pub use bootstrap::run_service;
pub use startup::{run_auth_service, run_community_service, run_user_service};
