mod common;

use axum::http::StatusCode;
use serde_json::json;
use server::routes;
use server::state::{AuthState, UserState};
use service::auth::Role;
use service::resilience::CircuitBreaker;

use common::*;

struct Apps {
    auth: axum::Router,
    users: axum::Router,
    admin_token: String,
}

async fn apps() -> anyhow::Result<Apps> {
    let db = sqlite_db().await?;
    let tokens = tokens();
    let auth = routes::auth_router(AuthState::new(db.clone(), tokens.clone(), CircuitBreaker::pass_through()), cors());
    let users = routes::user_router(UserState::new(db, tokens.clone(), CircuitBreaker::pass_through()), cors());
    let admin_token = token_for(&tokens, "root", Role::Admin);
    Ok(Apps { auth, users, admin_token })
}

#[tokio::test]
async fn register_then_login_sets_cookie_and_token() -> anyhow::Result<()> {
    let apps = apps().await?;

    let r = send(&apps.users, "POST", "/users", None, Some(registration("bob"))).await;
    assert_eq!(r.status, StatusCode::CREATED);
    assert_eq!(r.body["role"], "USER");

    let r = send(&apps.auth, "POST", "/auth/login", None, Some(json!({"login": "bob", "password": "Passw0rd!"}))).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["tokenType"], "Bearer");
    assert_eq!(r.body["login"], "bob");
    let cookie = r.set_cookie.expect("auth cookie");
    assert!(cookie.starts_with("auth_token="));
    let token = r.body["token"].as_str().unwrap().to_string();

    let me = send(&apps.auth, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body, json!({"login": "bob", "role": "USER"}));

    // 同一个 token 放在 cookie 里也可以
    let pair = cookie.split(';').next().unwrap();
    let me = send_with_cookie(&apps.auth, "GET", "/auth/me", pair).await;
    assert_eq!(me.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_401() -> anyhow::Result<()> {
    let apps = apps().await?;
    send(&apps.users, "POST", "/users", None, Some(registration("amy"))).await;

    let r = send(&apps.auth, "POST", "/auth/login", None, Some(json!({"login": "amy", "password": "wrong"}))).await;
    assert_eq!(r.status, StatusCode::UNAUTHORIZED);
    assert_eq!(r.body["error"], "invalid credentials");

    let r = send(&apps.auth, "POST", "/auth/login", None, Some(json!({"login": "ghost", "password": "x"}))).await;
    assert_eq!(r.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn blocked_user_gets_403_on_login() -> anyhow::Result<()> {
    let apps = apps().await?;
    send(&apps.users, "POST", "/users", None, Some(registration("eve"))).await;

    let r = send(&apps.users, "PATCH", "/users/eve?isBlocked=true", Some(&apps.admin_token), None).await;
    assert_eq!(r.status, StatusCode::NO_CONTENT);

    let r = send(&apps.auth, "POST", "/auth/login", None, Some(json!({"login": "eve", "password": "Passw0rd!"}))).await;
    assert_eq!(r.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() -> anyhow::Result<()> {
    let apps = apps().await?;
    assert_eq!(send(&apps.auth, "GET", "/auth/me", None, None).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(send(&apps.auth, "GET", "/auth/me", Some("garbage"), None).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(send(&apps.users, "GET", "/users", None, None).await.status, StatusCode::UNAUTHORIZED);

    let foreign = token_for(&service::auth::TokenService::new("other-secret", 60), "bob", Role::Admin);
    assert_eq!(send(&apps.users, "GET", "/users", Some(&foreign), None).await.status, StatusCode::UNAUTHORIZED);

    let health = send(&apps.auth, "GET", "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["service"], "auth-service");
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> anyhow::Result<()> {
    let apps = apps().await?;
    let r = send(&apps.auth, "POST", "/auth/logout", Some(&apps.admin_token), None).await;
    assert_eq!(r.status, StatusCode::NO_CONTENT);
    let cleared = r.set_cookie.expect("removal cookie");
    assert!(cleared.starts_with("auth_token=;"));
    assert!(cleared.contains("Max-Age=0"));

    // 带着 cookie 登出时同样被清除
    let registered = send(&apps.users, "POST", "/users", None, Some(registration("zoe"))).await;
    assert_eq!(registered.status, StatusCode::CREATED);
    let login = send(&apps.auth, "POST", "/auth/login", None, Some(json!({"login": "zoe", "password": "Passw0rd!"}))).await;
    let pair = login.set_cookie.expect("auth cookie");
    let pair = pair.split(';').next().unwrap();
    let r = send_with_cookie(&apps.auth, "POST", "/auth/logout", pair).await;
    assert_eq!(r.status, StatusCode::NO_CONTENT);
    assert!(r.set_cookie.expect("removal cookie").contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_public() -> anyhow::Result<()> {
    let apps = apps().await?;
    let r = send(&apps.auth, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(r.status, StatusCode::OK);
    assert!(r.body["paths"]["/auth/login"].is_object());
    Ok(())
}
