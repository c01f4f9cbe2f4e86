use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use service::access::can_create;
use service::auth::domain::Principal;
use service::community::domain::{Member, MemberDraft};
use service::errors::ServiceError;

use crate::errors::ApiError;
use crate::state::CommunityState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub login: Option<String>,
}

#[utoipa::path(
    get,
    path = "/communities/{cid}/users",
    tag = "members",
    params(("cid" = i32, Path, description = "Community id")),
    responses((status = 200, body = [crate::openapi::MemberDoc]), (status = 404, description = "No such community"))
)]
pub async fn list(State(state): State<CommunityState>, Path(cid): Path<i32>) -> Result<Json<Vec<Member>>, ApiError> {
    Ok(Json(state.members.find_all_by_community_id(cid).await?))
}

#[utoipa::path(
    post,
    path = "/communities/{cid}/users",
    tag = "members",
    params(("cid" = i32, Path, description = "Community id")),
    request_body = crate::openapi::MemberDoc,
    responses(
        (status = 201, body = crate::openapi::MemberDoc),
        (status = 400, description = "Unknown user, missing community or already a member"),
        (status = 403, description = "Only the user itself or an ADMIN may subscribe"),
    )
)]
pub async fn subscribe(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path(cid): Path<i32>,
    Json(draft): Json<MemberDraft>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    if !can_create(Some(&principal), draft.login.as_deref()) {
        return Err(ApiError::Forbidden);
    }
    let member = state.members.subscribe(cid, draft).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    delete,
    path = "/communities/{cid}/users",
    tag = "members",
    params(
        ("cid" = i32, Path, description = "Community id"),
        ("login" = String, Query, description = "Member login"),
    ),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Not a member"),
        (status = 403, description = "Only the user itself or an ADMIN may unsubscribe"),
    )
)]
pub async fn unsubscribe(
    State(state): State<CommunityState>,
    Extension(principal): Extension<Principal>,
    Path(cid): Path<i32>,
    Query(q): Query<LoginQuery>,
) -> Result<StatusCode, ApiError> {
    let login = q
        .login
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| ServiceError::illegal("login is mandatory"))?;
    if !principal.acts_as(&login) {
        return Err(ApiError::Forbidden);
    }
    state.members.unsubscribe(cid, &login).await?;
    Ok(StatusCode::NO_CONTENT)
}
