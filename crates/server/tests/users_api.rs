mod common;

use axum::http::StatusCode;
use serde_json::json;
use server::routes;
use server::state::UserState;
use service::auth::Role;
use service::resilience::CircuitBreaker;

use common::*;

struct Fixture {
    app: axum::Router,
    tokens: std::sync::Arc<service::auth::TokenService>,
}

impl Fixture {
    fn as_user(&self, login: &str) -> String { token_for(&self.tokens, login, Role::User) }
    fn as_admin(&self) -> String { token_for(&self.tokens, "root", Role::Admin) }
}

async fn fixture() -> anyhow::Result<Fixture> {
    let db = sqlite_db().await?;
    let tokens = tokens();
    let app = routes::user_router(UserState::new(db, tokens.clone(), CircuitBreaker::pass_through()), cors());
    for login in ["alice", "bob"] {
        let r = send(&app, "POST", "/users", None, Some(registration(login))).await;
        assert_eq!(r.status, StatusCode::CREATED);
    }
    Ok(Fixture { app, tokens })
}

#[tokio::test]
async fn personal_data_visible_to_self_and_admin_only() -> anyhow::Result<()> {
    let f = fixture().await?;

    let own = send(&f.app, "GET", "/users?login=alice", Some(&f.as_user("alice")), None).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["name"], "alice name");
    assert_eq!(own.body["birthday"], "1995-05-17");

    let other = send(&f.app, "GET", "/users?login=alice", Some(&f.as_user("bob")), None).await;
    assert_eq!(other.status, StatusCode::OK);
    assert!(other.body.get("name").is_none());
    assert!(other.body.get("passwordHash").is_none());

    let all = send(&f.app, "GET", "/users", Some(&f.as_admin()), None).await;
    let list = all.body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|u| u.get("phone").is_some()));
    Ok(())
}

#[tokio::test]
async fn lookup_by_email_and_count() -> anyhow::Result<()> {
    let f = fixture().await?;
    let t = f.as_user("bob");
    let r = send(&f.app, "GET", "/users?email=alice@example.com", Some(&t), None).await;
    assert_eq!(r.body["login"], "alice");

    let missing = send(&f.app, "GET", "/users?login=ghost", Some(&t), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "No user with login ghost");

    let count = send(&f.app, "GET", "/users/count", Some(&t), None).await;
    assert_eq!(count.body, json!({"count": 2}));
    Ok(())
}

#[tokio::test]
async fn registration_rejects_duplicates_and_ignores_role() -> anyhow::Result<()> {
    let f = fixture().await?;
    let dup = send(&f.app, "POST", "/users", None, Some(registration("alice"))).await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body["error"], "Such a user already exists: alice");

    let mut body = registration("mallory");
    body["role"] = json!("ADMIN");
    let r = send(&f.app, "POST", "/users", None, Some(body)).await;
    assert_eq!(r.status, StatusCode::CREATED);
    assert_eq!(r.body["role"], "USER");

    let mut body = registration("ops");
    body["role"] = json!("ADMIN");
    let r = send(&f.app, "POST", "/users", Some(&f.as_admin()), Some(body)).await;
    assert_eq!(r.body["role"], "ADMIN");

    let invalid = send(&f.app, "POST", "/users", None, Some(json!({"login": "x"}))).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn patch_is_owner_or_admin() -> anyhow::Result<()> {
    let f = fixture().await?;
    let patch = json!({"phone": "+999"});

    let denied = send(&f.app, "PATCH", "/users/alice", Some(&f.as_user("bob")), Some(patch.clone())).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let ok = send(&f.app, "PATCH", "/users/alice", Some(&f.as_user("alice")), Some(patch)).await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["phone"], "+999");
    assert_eq!(ok.body["name"], "alice name");

    let rename = send(&f.app, "PATCH", "/users/alice", Some(&f.as_admin()), Some(json!({"login": "alicia"}))).await;
    assert_eq!(rename.status, StatusCode::BAD_REQUEST);
    assert_eq!(rename.body["error"], "Login can not be changed");
    Ok(())
}

#[tokio::test]
async fn blocking_is_admin_only() -> anyhow::Result<()> {
    let f = fixture().await?;
    let r = send(&f.app, "PATCH", "/users/bob?isBlocked=true", Some(&f.as_user("bob")), None).await;
    assert_eq!(r.status, StatusCode::FORBIDDEN);

    let r = send(&f.app, "PATCH", "/users/bob?isBlocked=true", Some(&f.as_admin()), None).await;
    assert_eq!(r.status, StatusCode::NO_CONTENT);
    let bob = send(&f.app, "GET", "/users?login=bob", Some(&f.as_admin()), None).await;
    assert_eq!(bob.body["isBlocked"], true);

    let r = send(&f.app, "PATCH", "/users/ghost?isBlocked=true", Some(&f.as_admin()), None).await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_by_owner_then_gone() -> anyhow::Result<()> {
    let f = fixture().await?;
    assert_eq!(send(&f.app, "DELETE", "/users/bob", Some(&f.as_user("alice")), None).await.status, StatusCode::FORBIDDEN);
    assert_eq!(send(&f.app, "DELETE", "/users/bob", Some(&f.as_user("bob")), None).await.status, StatusCode::NO_CONTENT);
    let r = send(&f.app, "GET", "/users?login=bob", Some(&f.as_admin()), None).await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
    // 资源不存在时访问控制先拒绝
    assert_eq!(send(&f.app, "DELETE", "/users/bob", Some(&f.as_admin()), None).await.status, StatusCode::FORBIDDEN);
    Ok(())
}
