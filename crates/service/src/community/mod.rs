//! Community-service business logic: communities, members, posts, comments and likes.
//!
//! Every service shares one [`repository::CommunityRepository`] and, where a
//! user login must be checked against user-service, one [`remote::UserDirectory`].

pub mod domain;
pub mod repository;
pub mod repo;
pub mod remote;
pub mod community_service;
pub mod member_service;
pub mod post_service;
pub mod comment_service;
pub mod like_service;

pub use comment_service::CommentService;
pub use community_service::CommunityService;
pub use like_service::{CommentLikeService, PostLikeService};
pub use member_service::MemberService;
pub use post_service::PostService;

use crate::errors::ServiceError;

pub(crate) fn not_a_member(login: &str, community_id: i32) -> ServiceError {
    ServiceError::illegal(format!("User {login} is not a member of community {community_id}"))
}

/// Authorship may only move to another login on a privileged path.
pub(crate) fn check_author_change(stored: &str, patched: Option<&str>, privileged: bool) -> Result<(), ServiceError> {
    match patched {
        Some(login) if login != stored && !privileged => Err(ServiceError::illegal("User can not be changed")),
        _ => Ok(()),
    }
}
