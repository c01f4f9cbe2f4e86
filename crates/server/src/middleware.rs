use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, Method};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use service::auth::TokenService;
use tracing::warn;

use crate::errors::ApiError;

pub const AUTH_COOKIE: &str = "auth_token";

/// Requests that go through without a token: health, OpenAPI document,
/// CORS preflight, login and registration.
fn is_public(method: &Method, path: &str) -> bool {
    method == Method::OPTIONS
        || path == "/health"
        || path.starts_with("/api-docs")
        || (method == Method::POST && (path == "/auth/login" || path == "/users"))
}

/// `Authorization: Bearer <token>`, falling back to the `auth_token` cookie.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(authz) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return match authz.strip_prefix("Bearer ") {
            Some(token) => Some(token.trim().to_string()),
            None => {
                warn!("invalid Authorization format (expect Bearer)");
                None
            }
        };
    }
    CookieJar::from_headers(headers)
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// 校验 token 并把 Principal 放入请求扩展；公开路由上 token 可选
pub async fn require_bearer_token(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let public = is_public(req.method(), req.uri().path());

    let principal = match bearer_token(req.headers()) {
        Some(token) => match tokens.verify(&token) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(path = %req.uri().path(), error = %e, "token validation failed");
                None
            }
        },
        None => None,
    };

    match principal {
        Some(p) => {
            req.extensions_mut().insert(p);
        }
        None if public => {}
        None => {
            warn!(path = %req.uri().path(), method = %req.method(), "missing or invalid bearer token");
            return Err(ApiError::Unauthorized);
        }
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn public_routes() {
        assert!(is_public(&Method::POST, "/users"));
        assert!(is_public(&Method::POST, "/auth/login"));
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::GET, "/api-docs/openapi.json"));
        assert!(!is_public(&Method::GET, "/users"));
        assert!(!is_public(&Method::POST, "/communities"));
    }

    #[test]
    fn header_wins_over_cookie() {
        let mut h = HeaderMap::new();
        h.insert(header::COOKIE, HeaderValue::from_static("auth_token=from-cookie"));
        assert_eq!(bearer_token(&h).as_deref(), Some("from-cookie"));
        h.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(bearer_token(&h).as_deref(), Some("from-header"));
        h.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&h), None);
    }
}
