use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use service::auth::TokenService;
use service::community::remote::HttpUserDirectory;
use service::resilience::CircuitBreaker;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::{AuthState, CommunityState, UserState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Connect with the configured pool and bring the schema up to date.
async fn connect_and_migrate(cfg: &AppConfig) -> Result<DatabaseConnection, StartupError> {
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    models::db::test_connection(&db)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Database(format!("migration failed: {e}")))?;
    Ok(db)
}

fn breaker(cfg: &AppConfig) -> Result<CircuitBreaker, StartupError> {
    let breaker =
        CircuitBreaker::from_config(&cfg.circuit_breaker).map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    info!(stateful = breaker.is_stateful(), "circuit breaker policy selected");
    Ok(breaker)
}

async fn serve(service: &'static str, cfg: &AppConfig, app: Router) -> anyhow::Result<()> {
    let addr = cfg.server.bind_addr()?;
    info!(service, %addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub async fn build_auth_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let db = connect_and_migrate(cfg).await?;
    let tokens = Arc::new(TokenService::from_config(&cfg.auth));
    Ok(routes::auth_router(AuthState::new(db, tokens, breaker(cfg)?), build_cors()))
}

/// Also creates the configured bootstrap administrator on first start.
pub async fn build_user_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let db = connect_and_migrate(cfg).await?;
    let tokens = Arc::new(TokenService::from_config(&cfg.auth));
    let state = UserState::new(db, tokens, breaker(cfg)?);
    if let Some(admin) = &cfg.auth.bootstrap_admin {
        match state.users.ensure_admin(admin).await {
            Ok(true) => info!(login = %admin.login, "bootstrap admin created"),
            Ok(false) => info!(login = %admin.login, "bootstrap admin already present"),
            Err(e) => warn!(login = %admin.login, error = %e, "bootstrap admin not created"),
        }
    }
    Ok(routes::user_router(state, build_cors()))
}

pub async fn build_community_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let db = connect_and_migrate(cfg).await?;
    let tokens = Arc::new(TokenService::from_config(&cfg.auth));
    let users = HttpUserDirectory::from_config(&cfg.user_service, tokens.clone())
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    info!(user_service = %cfg.user_service.base_url, "user directory configured");
    let state = CommunityState::new(db, Arc::new(users), tokens, breaker(cfg)?);
    Ok(routes::community_router(state, build_cors()))
}

pub async fn run_auth_service(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_auth_app(&cfg).await?;
    serve("auth-service", &cfg, app).await
}

pub async fn run_user_service(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_user_app(&cfg).await?;
    serve("user-service", &cfg, app).await
}

pub async fn run_community_service(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_community_app(&cfg).await?;
    serve("community-service", &cfg, app).await
}
