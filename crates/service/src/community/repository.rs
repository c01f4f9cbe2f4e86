use async_trait::async_trait;

use super::domain::{
    Comment, CommentData, CommentLike, Community, CommunityData, Member, Post, PostData, PostLike,
};
use crate::errors::RepositoryError;

/// Persistence for everything community-service owns.
///
/// `update_*` expects the row to exist; `delete_*` returns whether a row was
/// removed. Deleting a parent removes its children.
#[async_trait]
pub trait CommunityRepository: Send + Sync {
    /// Every community with its member count.
    async fn find_communities(&self) -> Result<Vec<(Community, u64)>, RepositoryError>;
    async fn find_community(&self, id: i32) -> Result<Option<Community>, RepositoryError>;
    async fn find_community_by_name(&self, name: &str) -> Result<Option<Community>, RepositoryError>;
    async fn insert_community(&self, data: CommunityData) -> Result<Community, RepositoryError>;
    async fn update_community(&self, id: i32, data: CommunityData) -> Result<Community, RepositoryError>;
    async fn delete_community(&self, id: i32) -> Result<bool, RepositoryError>;

    async fn find_members(&self, community_id: i32) -> Result<Vec<Member>, RepositoryError>;
    async fn find_member(&self, login: &str) -> Result<Option<Member>, RepositoryError>;
    async fn is_member(&self, community_id: i32, login: &str) -> Result<bool, RepositoryError>;
    /// Creates the member row when needed and the membership, in one transaction.
    async fn subscribe(&self, community_id: i32, login: &str) -> Result<Member, RepositoryError>;
    /// Removes the membership and, when it was the last one, the member row.
    async fn unsubscribe(&self, community_id: i32, login: &str) -> Result<bool, RepositoryError>;

    async fn find_posts(&self, community_id: i32) -> Result<Vec<Post>, RepositoryError>;
    async fn find_post(&self, id: i32) -> Result<Option<Post>, RepositoryError>;
    async fn insert_post(&self, community_id: i32, data: PostData) -> Result<Post, RepositoryError>;
    async fn update_post(&self, id: i32, data: PostData) -> Result<Post, RepositoryError>;
    async fn delete_post(&self, id: i32) -> Result<bool, RepositoryError>;

    async fn find_comments(&self, post_id: i32) -> Result<Vec<Comment>, RepositoryError>;
    async fn find_comment(&self, id: i32) -> Result<Option<Comment>, RepositoryError>;
    async fn insert_comment(&self, post_id: i32, data: CommentData) -> Result<Comment, RepositoryError>;
    async fn update_comment(&self, id: i32, data: CommentData) -> Result<Comment, RepositoryError>;
    async fn delete_comment(&self, id: i32) -> Result<bool, RepositoryError>;

    async fn find_post_likes(&self, post_id: i32) -> Result<Vec<PostLike>, RepositoryError>;
    async fn find_post_like(&self, id: i32) -> Result<Option<PostLike>, RepositoryError>;
    async fn insert_post_like(&self, post_id: i32, user_login: &str) -> Result<PostLike, RepositoryError>;
    async fn delete_post_like(&self, id: i32) -> Result<bool, RepositoryError>;

    async fn find_comment_likes(&self, comment_id: i32) -> Result<Vec<CommentLike>, RepositoryError>;
    async fn find_comment_like(&self, id: i32) -> Result<Option<CommentLike>, RepositoryError>;
    async fn insert_comment_like(&self, comment_id: i32, user_login: &str) -> Result<CommentLike, RepositoryError>;
    async fn delete_comment_like(&self, id: i32) -> Result<bool, RepositoryError>;
}

/// Simple in-memory mock repository for tests and doc examples.
/// Mirrors the schema's unique keys and cascades.
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        next_id: i32,
        communities: BTreeMap<i32, Community>,
        members: BTreeSet<String>,
        memberships: BTreeSet<(i32, String)>,
        posts: BTreeMap<i32, Post>,
        comments: BTreeMap<i32, Comment>,
        post_likes: BTreeMap<i32, PostLike>,
        comment_likes: BTreeMap<i32, CommentLike>,
    }

    impl State {
        fn next_id(&mut self) -> i32 {
            self.next_id += 1;
            self.next_id
        }

        fn remove_comment(&mut self, id: i32) -> bool {
            self.comment_likes.retain(|_, l| l.comment_id != id);
            self.comments.remove(&id).is_some()
        }

        fn remove_post(&mut self, id: i32) -> bool {
            let comment_ids: Vec<i32> = self.comments.values().filter(|c| c.post_id == id).map(|c| c.id).collect();
            for cid in comment_ids {
                self.remove_comment(cid);
            }
            self.post_likes.retain(|_, l| l.post_id != id);
            self.posts.remove(&id).is_some()
        }
    }

    fn conflict(what: &str) -> RepositoryError { RepositoryError::Conflict(what.to_string()) }

    fn not_updated() -> RepositoryError { RepositoryError::Db("record not updated".into()) }

    #[derive(Default)]
    pub struct MockCommunityRepository {
        state: Mutex<State>,
        down: AtomicBool,
    }

    impl MockCommunityRepository {
        /// Make every subsequent call fail as if the database were unreachable.
        pub fn set_down(&self, down: bool) { self.down.store(down, Ordering::SeqCst); }

        fn state(&self) -> Result<std::sync::MutexGuard<'_, State>, RepositoryError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(RepositoryError::Db("connection refused".into()));
            }
            self.state.lock().map_err(|e| RepositoryError::Db(e.to_string()))
        }
    }

    #[async_trait]
    impl CommunityRepository for MockCommunityRepository {
        async fn find_communities(&self) -> Result<Vec<(Community, u64)>, RepositoryError> {
            let s = self.state()?;
            Ok(s.communities
                .values()
                .map(|c| {
                    let n = s.memberships.iter().filter(|(cid, _)| *cid == c.id).count() as u64;
                    (c.clone(), n)
                })
                .collect())
        }

        async fn find_community(&self, id: i32) -> Result<Option<Community>, RepositoryError> {
            Ok(self.state()?.communities.get(&id).cloned())
        }

        async fn find_community_by_name(&self, name: &str) -> Result<Option<Community>, RepositoryError> {
            Ok(self.state()?.communities.values().find(|c| c.name == name).cloned())
        }

        async fn insert_community(&self, data: CommunityData) -> Result<Community, RepositoryError> {
            let mut s = self.state()?;
            if s.communities.values().any(|c| c.name == data.name) {
                return Err(conflict("community.name"));
            }
            let id = s.next_id();
            let c = Community {
                id,
                name: data.name,
                description: data.description,
                admin_login: data.admin_login,
                created_at: Utc::now(),
            };
            s.communities.insert(id, c.clone());
            Ok(c)
        }

        async fn update_community(&self, id: i32, data: CommunityData) -> Result<Community, RepositoryError> {
            let mut s = self.state()?;
            if s.communities.values().any(|c| c.name == data.name && c.id != id) {
                return Err(conflict("community.name"));
            }
            let c = s.communities.get_mut(&id).ok_or_else(not_updated)?;
            c.name = data.name;
            c.description = data.description;
            c.admin_login = data.admin_login;
            Ok(c.clone())
        }

        async fn delete_community(&self, id: i32) -> Result<bool, RepositoryError> {
            let mut s = self.state()?;
            let post_ids: Vec<i32> = s.posts.values().filter(|p| p.community_id == id).map(|p| p.id).collect();
            for pid in post_ids {
                s.remove_post(pid);
            }
            s.memberships.retain(|(cid, _)| *cid != id);
            Ok(s.communities.remove(&id).is_some())
        }

        async fn find_members(&self, community_id: i32) -> Result<Vec<Member>, RepositoryError> {
            let s = self.state()?;
            Ok(s.memberships
                .iter()
                .filter(|(cid, _)| *cid == community_id)
                .map(|(_, login)| Member { login: login.clone() })
                .collect())
        }

        async fn find_member(&self, login: &str) -> Result<Option<Member>, RepositoryError> {
            let s = self.state()?;
            Ok(s.members.get(login).map(|l| Member { login: l.clone() }))
        }

        async fn is_member(&self, community_id: i32, login: &str) -> Result<bool, RepositoryError> {
            Ok(self.state()?.memberships.contains(&(community_id, login.to_string())))
        }

        async fn subscribe(&self, community_id: i32, login: &str) -> Result<Member, RepositoryError> {
            let mut s = self.state()?;
            if !s.communities.contains_key(&community_id) {
                return Err(conflict("community_membership.community_id"));
            }
            if !s.memberships.insert((community_id, login.to_string())) {
                return Err(conflict("community_membership"));
            }
            s.members.insert(login.to_string());
            Ok(Member { login: login.to_string() })
        }

        async fn unsubscribe(&self, community_id: i32, login: &str) -> Result<bool, RepositoryError> {
            let mut s = self.state()?;
            let removed = s.memberships.remove(&(community_id, login.to_string()));
            if removed && !s.memberships.iter().any(|(_, l)| l == login) {
                s.members.remove(login);
            }
            Ok(removed)
        }

        async fn find_posts(&self, community_id: i32) -> Result<Vec<Post>, RepositoryError> {
            Ok(self.state()?.posts.values().filter(|p| p.community_id == community_id).cloned().collect())
        }

        async fn find_post(&self, id: i32) -> Result<Option<Post>, RepositoryError> {
            Ok(self.state()?.posts.get(&id).cloned())
        }

        async fn insert_post(&self, community_id: i32, data: PostData) -> Result<Post, RepositoryError> {
            let mut s = self.state()?;
            if !s.communities.contains_key(&community_id) {
                return Err(conflict("post.community_id"));
            }
            let id = s.next_id();
            let p = Post { id, message: data.message, created_at: Utc::now(), user_login: data.user_login, community_id };
            s.posts.insert(id, p.clone());
            Ok(p)
        }

        async fn update_post(&self, id: i32, data: PostData) -> Result<Post, RepositoryError> {
            let mut s = self.state()?;
            let p = s.posts.get_mut(&id).ok_or_else(not_updated)?;
            p.message = data.message;
            p.user_login = data.user_login;
            Ok(p.clone())
        }

        async fn delete_post(&self, id: i32) -> Result<bool, RepositoryError> {
            Ok(self.state()?.remove_post(id))
        }

        async fn find_comments(&self, post_id: i32) -> Result<Vec<Comment>, RepositoryError> {
            Ok(self.state()?.comments.values().filter(|c| c.post_id == post_id).cloned().collect())
        }

        async fn find_comment(&self, id: i32) -> Result<Option<Comment>, RepositoryError> {
            Ok(self.state()?.comments.get(&id).cloned())
        }

        async fn insert_comment(&self, post_id: i32, data: CommentData) -> Result<Comment, RepositoryError> {
            let mut s = self.state()?;
            if !s.posts.contains_key(&post_id) {
                return Err(conflict("comment.post_id"));
            }
            let id = s.next_id();
            let c = Comment { id, message: data.message, created_at: Utc::now(), user_login: data.user_login, post_id };
            s.comments.insert(id, c.clone());
            Ok(c)
        }

        async fn update_comment(&self, id: i32, data: CommentData) -> Result<Comment, RepositoryError> {
            let mut s = self.state()?;
            let c = s.comments.get_mut(&id).ok_or_else(not_updated)?;
            c.message = data.message;
            c.user_login = data.user_login;
            Ok(c.clone())
        }

        async fn delete_comment(&self, id: i32) -> Result<bool, RepositoryError> {
            Ok(self.state()?.remove_comment(id))
        }

        async fn find_post_likes(&self, post_id: i32) -> Result<Vec<PostLike>, RepositoryError> {
            Ok(self.state()?.post_likes.values().filter(|l| l.post_id == post_id).cloned().collect())
        }

        async fn find_post_like(&self, id: i32) -> Result<Option<PostLike>, RepositoryError> {
            Ok(self.state()?.post_likes.get(&id).cloned())
        }

        async fn insert_post_like(&self, post_id: i32, user_login: &str) -> Result<PostLike, RepositoryError> {
            let mut s = self.state()?;
            if !s.posts.contains_key(&post_id) {
                return Err(conflict("post_like.post_id"));
            }
            if s.post_likes.values().any(|l| l.post_id == post_id && l.user_login == user_login) {
                return Err(conflict("uniq_post_like_user"));
            }
            let id = s.next_id();
            let l = PostLike { id, created_at: Utc::now(), user_login: user_login.to_string(), post_id };
            s.post_likes.insert(id, l.clone());
            Ok(l)
        }

        async fn delete_post_like(&self, id: i32) -> Result<bool, RepositoryError> {
            Ok(self.state()?.post_likes.remove(&id).is_some())
        }

        async fn find_comment_likes(&self, comment_id: i32) -> Result<Vec<CommentLike>, RepositoryError> {
            Ok(self.state()?.comment_likes.values().filter(|l| l.comment_id == comment_id).cloned().collect())
        }

        async fn find_comment_like(&self, id: i32) -> Result<Option<CommentLike>, RepositoryError> {
            Ok(self.state()?.comment_likes.get(&id).cloned())
        }

        async fn insert_comment_like(&self, comment_id: i32, user_login: &str) -> Result<CommentLike, RepositoryError> {
            let mut s = self.state()?;
            if !s.comments.contains_key(&comment_id) {
                return Err(conflict("comment_like.comment_id"));
            }
            if s.comment_likes.values().any(|l| l.comment_id == comment_id && l.user_login == user_login) {
                return Err(conflict("uniq_comment_like_user"));
            }
            let id = s.next_id();
            let l = CommentLike { id, created_at: Utc::now(), user_login: user_login.to_string(), comment_id };
            s.comment_likes.insert(id, l.clone());
            Ok(l)
        }

        async fn delete_comment_like(&self, id: i32) -> Result<bool, RepositoryError> {
            Ok(self.state()?.comment_likes.remove(&id).is_some())
        }
    }
}
