use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use service::auth::domain::Principal;
use service::errors::ServiceError;
use service::users::domain::{User, UserDraft, UserView};

use crate::errors::{ApiError, OrNotFound};
use crate::state::UserState;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub login: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockQuery {
    pub is_blocked: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CountBody {
    pub count: u64,
}

// 个人资料只对管理员或本人可见
fn view_for(principal: &Principal, user: &User) -> UserView {
    user.view(principal.acts_as(&user.login))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(
        ("login" = Option<String>, Query, description = "Exact login"),
        ("email" = Option<String>, Query, description = "Exact email"),
    ),
    responses(
        (status = 200, description = "All users, or the single match", body = [crate::openapi::UserDoc]),
        (status = 404, description = "No such user", body = crate::openapi::ErrorResponse),
    )
)]
pub async fn find(
    State(state): State<UserState>,
    Extension(principal): Extension<Principal>,
    Query(q): Query<UserQuery>,
) -> Result<Response, ApiError> {
    if let Some(login) = q.login {
        let user = state
            .users
            .find_by_login(&login)
            .await?
            .or_not_found(|| format!("No user with login {login}"))?;
        return Ok(Json(view_for(&principal, &user)).into_response());
    }
    if let Some(email) = q.email {
        let user = state
            .users
            .find_by_email(&email)
            .await?
            .or_not_found(|| format!("No user with email {email}"))?;
        return Ok(Json(view_for(&principal, &user)).into_response());
    }
    let users: Vec<UserView> = state.users.find_all().await?.iter().map(|u| view_for(&principal, u)).collect();
    Ok(Json(users).into_response())
}

#[utoipa::path(get, path = "/users/count", tag = "users", responses((status = 200, body = crate::openapi::CountResponse)))]
pub async fn count(State(state): State<UserState>) -> Result<Json<CountBody>, ApiError> {
    Ok(Json(CountBody { count: state.users.count().await? }))
}

/// Public registration. Role and blocked flag count only when an ADMIN calls.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = crate::openapi::UserDraftDoc,
    responses(
        (status = 201, description = "Registered", body = crate::openapi::UserDoc),
        (status = 400, description = "Invalid or duplicate user", body = crate::openapi::ErrorResponse),
    )
)]
pub async fn create(
    State(state): State<UserState>,
    principal: Option<Extension<Principal>>,
    Json(draft): Json<UserDraft>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    let privileged = principal.is_some_and(|Extension(p)| p.is_admin());
    let user = state.users.save(draft, privileged).await?;
    Ok((StatusCode::CREATED, Json(user.view(true))))
}

/// `?isBlocked=` switches the blocked flag (ADMIN only); otherwise the body
/// is a partial update by the owner or an ADMIN.
#[utoipa::path(
    patch,
    path = "/users/{login}",
    tag = "users",
    params(
        ("login" = String, Path, description = "User login"),
        ("isBlocked" = Option<bool>, Query, description = "Block or unblock"),
    ),
    request_body = crate::openapi::UserDraftDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::UserDoc),
        (status = 204, description = "Blocked flag changed"),
        (status = 403, description = "Access is denied"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn patch(
    State(state): State<UserState>,
    Extension(principal): Extension<Principal>,
    Path(login): Path<String>,
    Query(q): Query<BlockQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    if let Some(blocked) = q.is_blocked {
        if !principal.is_admin() {
            return Err(ApiError::Forbidden);
        }
        state.users.set_blocked_by_login(&login, blocked).await?;
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    if !state.access.can_patch(Some(&principal), &login).await {
        return Err(ApiError::Forbidden);
    }
    let patch: UserDraft = serde_json::from_slice(&body)
        .map_err(|e| ServiceError::illegal(format!("Malformed user: {e}")))?;
    let user = state.users.update(&login, patch, principal.is_admin()).await?;
    Ok(Json(user.view(true)).into_response())
}

#[utoipa::path(
    delete,
    path = "/users/{login}",
    tag = "users",
    params(("login" = String, Path, description = "User login")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Access is denied"))
)]
pub async fn delete(
    State(state): State<UserState>,
    Extension(principal): Extension<Principal>,
    Path(login): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.access.can_delete(Some(&principal), &login).await {
        return Err(ApiError::Forbidden);
    }
    state.users.delete_by_login(&login).await?;
    Ok(StatusCode::NO_CONTENT)
}
