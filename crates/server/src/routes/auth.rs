use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use service::auth::domain::{AuthSession, LoginInput, Principal};
use tracing::info;

use crate::errors::ApiError;
use crate::middleware::AUTH_COOKIE;
use crate::state::AuthState;

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = crate::openapi::AuthSessionDoc),
        (status = 401, description = "Bad credentials", body = crate::openapi::ErrorResponse),
        (status = 403, description = "User is blocked", body = crate::openapi::ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<AuthSession>), ApiError> {
    let session = state.auth.login(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    Ok((jar.add(cookie), Json(session)))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(Extension(principal): Extension<Principal>, jar: CookieJar) -> (CookieJar, StatusCode) {
    info!(login = %principal.login, "user_logged_out");
    // 无论请求是否带 cookie 都下发过期的 auth_token
    let mut removal = Cookie::new(AUTH_COOKIE, "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.make_removal();
    (jar.add(removal), StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current principal", body = crate::openapi::PrincipalDoc),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn me(Extension(principal): Extension<Principal>) -> Json<Principal> {
    Json(principal)
}
