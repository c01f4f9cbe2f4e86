use axum::{routing::get, Json, Router};
use utoipa::OpenApi;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct ErrorResponse { pub error: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub login: String, pub password: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthSessionDoc {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub login: String,
    /// `USER` or `ADMIN`
    pub role: String,
}

#[derive(ToSchema)]
pub struct PrincipalDoc { pub login: String, pub role: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    pub login: String,
    pub email: String,
    pub role: String,
    pub is_blocked: bool,
    /// Only for ADMIN or the user itself
    pub name: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDraftDoc {
    pub login: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub is_blocked: Option<bool>,
    pub name: Option<String>,
    pub phone: Option<String>,
    /// `YYYY-MM-DD`
    pub birthday: Option<String>,
}

#[derive(ToSchema)]
pub struct CountResponse { pub count: u64 }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunityDoc {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub admin_login: String,
    pub created_at: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunityDraftDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub admin_login: Option<String>,
}

#[derive(ToSchema)]
pub struct MemberDoc { pub login: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraftDoc { pub message: Option<String>, pub user_login: Option<String> }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeDraftDoc { pub user_login: Option<String> }

#[derive(OpenApi)]
#[openapi(
    paths(crate::routes::auth::login, crate::routes::auth::logout, crate::routes::auth::me),
    components(schemas(LoginRequest, AuthSessionDoc, PrincipalDoc, ErrorResponse)),
    tags((name = "auth"))
)]
pub struct AuthApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::users::find,
        crate::routes::users::count,
        crate::routes::users::create,
        crate::routes::users::patch,
        crate::routes::users::delete,
    ),
    components(schemas(UserDoc, UserDraftDoc, CountResponse, ErrorResponse)),
    tags((name = "users"))
)]
pub struct UserApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::communities::find,
        crate::routes::communities::get,
        crate::routes::communities::create,
        crate::routes::communities::patch,
        crate::routes::communities::delete,
        crate::routes::members::list,
        crate::routes::members::subscribe,
        crate::routes::members::unsubscribe,
        crate::routes::posts::list,
        crate::routes::posts::get,
        crate::routes::posts::create,
        crate::routes::posts::patch,
        crate::routes::posts::delete,
        crate::routes::comments::list,
        crate::routes::comments::get,
        crate::routes::comments::create,
        crate::routes::comments::patch,
        crate::routes::comments::delete,
        crate::routes::likes::list_post_likes,
        crate::routes::likes::get_post_like,
        crate::routes::likes::create_post_like,
        crate::routes::likes::delete_post_like,
        crate::routes::likes::list_comment_likes,
        crate::routes::likes::get_comment_like,
        crate::routes::likes::create_comment_like,
        crate::routes::likes::delete_comment_like,
    ),
    components(schemas(
        CommunityDoc,
        CommunityDraftDoc,
        MemberDoc,
        MessageDraftDoc,
        LikeDraftDoc,
        ErrorResponse,
    )),
    tags((name = "communities"), (name = "members"), (name = "posts"), (name = "comments"), (name = "likes"))
)]
pub struct CommunityApiDoc;

/// `GET /api-docs/openapi.json` serving the given document.
pub fn docs_router<S: Clone + Send + Sync + 'static>(doc: utoipa::openapi::OpenApi) -> Router<S> {
    Router::new().route("/api-docs/openapi.json", get(move || {
        let doc = doc.clone();
        async move { Json(doc) }
    }))
}
