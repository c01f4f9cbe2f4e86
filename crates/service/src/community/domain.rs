use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::validation::{ensure_valid, mandatory, replace_if_some, CopyNonNull, Validate, Violation};

// ---- stored values ----

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub admin_login: String,
    pub created_at: DateTime<Utc>,
}

/// Local user known to community-service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Member {
    pub login: String,
}

#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub user_login: String,
    pub community_id: i32,
}

// 相等性不比较自增 id
impl PartialEq for Post {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
            && self.created_at == other.created_at
            && self.user_login == other.user_login
            && self.community_id == other.community_id
    }
}

#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i32,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub user_login: String,
    pub post_id: i32,
}

impl PartialEq for Comment {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
            && self.created_at == other.created_at
            && self.user_login == other.user_login
            && self.post_id == other.post_id
    }
}

#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostLike {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub user_login: String,
    pub post_id: i32,
}

impl PartialEq for PostLike {
    fn eq(&self, other: &Self) -> bool {
        self.created_at == other.created_at && self.user_login == other.user_login && self.post_id == other.post_id
    }
}

#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentLike {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub user_login: String,
    pub comment_id: i32,
}

impl PartialEq for CommentLike {
    fn eq(&self, other: &Self) -> bool {
        self.created_at == other.created_at && self.user_login == other.user_login && self.comment_id == other.comment_id
    }
}

/// Oldest first, ties by id.
pub(crate) fn chronological<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i32)) {
    items.sort_by_key(|item| key(item));
}

// ---- validated write data handed to the repository ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityData {
    pub name: String,
    pub description: String,
    pub admin_login: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostData {
    pub message: String,
    pub user_login: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentData {
    pub message: String,
    pub user_login: String,
}

fn incomplete(what: &str) -> ServiceError { ServiceError::illegal(format!("incomplete {what} data")) }

// ---- drafts: request payloads for create and patch ----

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub admin_login: Option<String>,
}

impl From<&Community> for CommunityDraft {
    fn from(c: &Community) -> Self {
        Self {
            name: Some(c.name.clone()),
            description: Some(c.description.clone()),
            admin_login: Some(c.admin_login.clone()),
        }
    }
}

impl CopyNonNull for CommunityDraft {
    fn copy_non_null(&mut self, patch: Self) {
        replace_if_some(&mut self.name, patch.name);
        replace_if_some(&mut self.description, patch.description);
        replace_if_some(&mut self.admin_login, patch.admin_login);
    }
}

impl Validate for CommunityDraft {
    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        mandatory(&mut out, "name", &self.name, "Name is mandatory");
        mandatory(&mut out, "description", &self.description, "Description is mandatory");
        mandatory(&mut out, "adminLogin", &self.admin_login, "Admin login is mandatory");
        out
    }
}

impl CommunityDraft {
    pub fn validated(self) -> Result<CommunityData, ServiceError> {
        ensure_valid(&self)?;
        match (self.name, self.description, self.admin_login) {
            (Some(name), Some(description), Some(admin_login)) => Ok(CommunityData { name, description, admin_login }),
            _ => Err(incomplete("community")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDraft {
    pub login: Option<String>,
}

impl Validate for MemberDraft {
    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        mandatory(&mut out, "login", &self.login, "Login is mandatory");
        out
    }
}

impl MemberDraft {
    pub fn validated(self) -> Result<Member, ServiceError> {
        ensure_valid(&self)?;
        self.login.map(|login| Member { login }).ok_or_else(|| incomplete("member"))
    }
}

/// Payload shared by posts and comments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    pub message: Option<String>,
    pub user_login: Option<String>,
}

pub type PostDraft = MessageDraft;
pub type CommentDraft = MessageDraft;

impl From<&Post> for MessageDraft {
    fn from(p: &Post) -> Self { Self { message: Some(p.message.clone()), user_login: Some(p.user_login.clone()) } }
}

impl From<&Comment> for MessageDraft {
    fn from(c: &Comment) -> Self { Self { message: Some(c.message.clone()), user_login: Some(c.user_login.clone()) } }
}

impl CopyNonNull for MessageDraft {
    fn copy_non_null(&mut self, patch: Self) {
        replace_if_some(&mut self.message, patch.message);
        replace_if_some(&mut self.user_login, patch.user_login);
    }
}

impl Validate for MessageDraft {
    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        mandatory(&mut out, "message", &self.message, "Message is mandatory");
        mandatory(&mut out, "userLogin", &self.user_login, "User is mandatory");
        out
    }
}

impl MessageDraft {
    pub fn validated_post(self) -> Result<PostData, ServiceError> {
        ensure_valid(&self)?;
        match (self.message, self.user_login) {
            (Some(message), Some(user_login)) => Ok(PostData { message, user_login }),
            _ => Err(incomplete("post")),
        }
    }

    pub fn validated_comment(self) -> Result<CommentData, ServiceError> {
        ensure_valid(&self)?;
        match (self.message, self.user_login) {
            (Some(message), Some(user_login)) => Ok(CommentData { message, user_login }),
            _ => Err(incomplete("comment")),
        }
    }
}

/// Payload for post and comment likes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeDraft {
    pub user_login: Option<String>,
}

impl Validate for LikeDraft {
    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        mandatory(&mut out, "userLogin", &self.user_login, "User is mandatory");
        out
    }
}

impl LikeDraft {
    /// The liking user's login.
    pub fn validated(self) -> Result<String, ServiceError> {
        ensure_valid(&self)?;
        self.user_login.ok_or_else(|| incomplete("like"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_community_draft_has_three_violations() {
        let v = CommunityDraft::default().violations();
        assert_eq!(v.len(), 3);
        assert_eq!(
            CommunityDraft::default().validated().unwrap_err(),
            ServiceError::illegal("name is mandatory, description is mandatory, admin login is mandatory")
        );
    }

    #[test]
    fn copy_construction_then_patch() {
        let stored = Community {
            id: 7,
            name: "rust".into(),
            description: "systems".into(),
            admin_login: "alice".into(),
            created_at: Utc::now(),
        };
        let mut d = CommunityDraft::from(&stored);
        d.copy_non_null(CommunityDraft { description: Some("fearless".into()), ..Default::default() });
        let data = d.validated().unwrap();
        assert_eq!(data, CommunityData { name: "rust".into(), description: "fearless".into(), admin_login: "alice".into() });
    }

    #[test]
    fn posts_equal_regardless_of_id() {
        let at = Utc::now();
        let a = Post { id: 1, message: "m".into(), created_at: at, user_login: "u".into(), community_id: 3 };
        let b = Post { id: 2, ..a.clone() };
        assert_eq!(a, b);
        let c = Post { message: "other".into(), ..a.clone() };
        assert_ne!(a, c);
    }

    #[test]
    fn like_and_member_drafts_validate() {
        assert_eq!(LikeDraft::default().validated().unwrap_err(), ServiceError::illegal("user is mandatory"));
        assert_eq!(MemberDraft { login: Some("  ".into()) }.validated().unwrap_err(), ServiceError::illegal("login is mandatory"));
        assert_eq!(MemberDraft { login: Some("bob".into()) }.validated().unwrap(), Member { login: "bob".into() });
    }

    #[test]
    fn message_draft_reports_both_fields() {
        let err = MessageDraft::default().validated_post().unwrap_err();
        assert_eq!(err, ServiceError::illegal("message is mandatory, user is mandatory"));
    }

    #[test]
    fn drafts_ignore_client_ids() {
        let d: CommunityDraft = serde_json::from_str(r#"{"id":99,"name":"n","description":"d","adminLogin":"a"}"#).unwrap();
        assert_eq!(d.admin_login.as_deref(), Some("a"));
    }
}
