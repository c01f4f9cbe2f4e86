#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use configs::DatabaseConfig;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use service::auth::{Principal, Role, TokenService};
use tower::ServiceExt;

pub async fn sqlite_db() -> anyhow::Result<DatabaseConnection> {
    let db = models::db::connect_with_config(&DatabaseConfig::sqlite_memory()).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn tokens() -> Arc<TokenService> {
    Arc::new(TokenService::new("test-secret", 3600))
}

pub fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

pub fn token_for(tokens: &TokenService, login: &str, role: Role) -> String {
    tokens.issue(&Principal::new(login, role)).unwrap()
}

pub struct Reply {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

/// One request through the router; empty bodies come back as `Value::Null`.
pub async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    into_reply(app.clone().oneshot(req).await.unwrap()).await
}

pub async fn send_with_cookie(app: &Router, method: &str, uri: &str, cookie: &str) -> Reply {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    into_reply(app.clone().oneshot(req).await.unwrap()).await
}

async fn into_reply(resp: axum::response::Response) -> Reply {
    let status = resp.status();
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    Reply { status, set_cookie, body }
}

pub fn registration(login: &str) -> Value {
    json!({
        "login": login,
        "email": format!("{login}@example.com"),
        "password": "Passw0rd!",
        "name": format!("{login} name"),
        "phone": "+100200300",
        "birthday": "1995-05-17"
    })
}
