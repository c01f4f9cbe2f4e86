pub mod auth;
pub mod users;
pub mod communities;
pub mod members;
pub mod posts;
pub mod comments;
pub mod likes;
pub mod scope;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use common::types::Health;
use service::auth::TokenService;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use crate::middleware::require_bearer_token;
use crate::openapi::{docs_router, AuthApiDoc, CommunityApiDoc, UserApiDoc};
use crate::state::{AuthState, CommunityState, UserState};

pub async fn health(service: &'static str) -> Json<Health> {
    Json(Health::ok(service))
}

/// auth-service: login, logout, current principal.
pub fn auth_router(state: AuthState, cors: CorsLayer) -> Router {
    let tokens = state.tokens.clone();
    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .with_state(state);
    finish("auth-service", api, AuthApiDoc::openapi(), tokens, cors)
}

/// user-service: accounts, personal data, blocking.
pub fn user_router(state: UserState, cors: CorsLayer) -> Router {
    let tokens = state.tokens.clone();
    let api = Router::new()
        .route("/users", get(users::find).post(users::create))
        .route("/users/count", get(users::count))
        .route("/users/:login", axum::routing::patch(users::patch).delete(users::delete))
        .with_state(state);
    finish("user-service", api, UserApiDoc::openapi(), tokens, cors)
}

/// community-service: communities and everything nested under them.
pub fn community_router(state: CommunityState, cors: CorsLayer) -> Router {
    let tokens = state.tokens.clone();
    let api = Router::new()
        .route("/communities", get(communities::find).post(communities::create))
        .route(
            "/communities/:cid",
            get(communities::get).patch(communities::patch).delete(communities::delete),
        )
        .route(
            "/communities/:cid/users",
            get(members::list).post(members::subscribe).delete(members::unsubscribe),
        )
        .route("/communities/:cid/posts", get(posts::list).post(posts::create))
        .route(
            "/communities/:cid/posts/:pid",
            get(posts::get).patch(posts::patch).delete(posts::delete),
        )
        .route("/communities/:cid/posts/:pid/comments", get(comments::list).post(comments::create))
        .route(
            "/communities/:cid/posts/:pid/comments/:comment_id",
            get(comments::get).patch(comments::patch).delete(comments::delete),
        )
        .route(
            "/communities/:cid/posts/:pid/likes",
            get(likes::list_post_likes).post(likes::create_post_like),
        )
        .route(
            "/communities/:cid/posts/:pid/likes/:like_id",
            get(likes::get_post_like).delete(likes::delete_post_like),
        )
        .route(
            "/communities/:cid/posts/:pid/comments/:comment_id/likes",
            get(likes::list_comment_likes).post(likes::create_comment_like),
        )
        .route(
            "/communities/:cid/posts/:pid/comments/:comment_id/likes/:like_id",
            get(likes::get_comment_like).delete(likes::delete_comment_like),
        )
        .with_state(state);
    finish("community-service", api, CommunityApiDoc::openapi(), tokens, cors)
}

/// Shared outer layers: health, OpenAPI document, token check, CORS, tracing.
fn finish(
    service: &'static str,
    api: Router,
    doc: utoipa::openapi::OpenApi,
    tokens: Arc<TokenService>,
    cors: CorsLayer,
) -> Router {
    Router::new()
        .route("/health", get(move || health(service)))
        .merge(docs_router(doc))
        .merge(api)
        .layer(middleware::from_fn_with_state(tokens, require_bearer_token))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
