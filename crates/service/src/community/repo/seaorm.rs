use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use models::{comment, comment_like, community, community_member, community_membership, post, post_like};

use crate::community::domain::{
    Comment, CommentData, CommentLike, Community, CommunityData, Member, Post, PostData, PostLike,
};
use crate::community::repository::CommunityRepository;
use crate::errors::RepositoryError;

pub struct SeaOrmCommunityRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCommunityRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

impl From<community::Model> for Community {
    fn from(m: community::Model) -> Self {
        Community {
            id: m.id,
            name: m.name,
            description: m.description,
            admin_login: m.admin_login,
            created_at: m.created_at.into(),
        }
    }
}

impl From<post::Model> for Post {
    fn from(m: post::Model) -> Self {
        Post { id: m.id, message: m.message, created_at: m.created_at.into(), user_login: m.user_login, community_id: m.community_id }
    }
}

impl From<comment::Model> for Comment {
    fn from(m: comment::Model) -> Self {
        Comment { id: m.id, message: m.message, created_at: m.created_at.into(), user_login: m.user_login, post_id: m.post_id }
    }
}

impl From<post_like::Model> for PostLike {
    fn from(m: post_like::Model) -> Self {
        PostLike { id: m.id, created_at: m.created_at.into(), user_login: m.user_login, post_id: m.post_id }
    }
}

impl From<comment_like::Model> for CommentLike {
    fn from(m: comment_like::Model) -> Self {
        CommentLike { id: m.id, created_at: m.created_at.into(), user_login: m.user_login, comment_id: m.comment_id }
    }
}

#[async_trait::async_trait]
impl CommunityRepository for SeaOrmCommunityRepository {
    async fn find_communities(&self) -> Result<Vec<(Community, u64)>, RepositoryError> {
        let counts: HashMap<i32, i64> = community_membership::Entity::find()
            .select_only()
            .column(community_membership::Column::CommunityId)
            .column_as(Expr::col(community_membership::Column::UserLogin).count(), "members")
            .group_by(community_membership::Column::CommunityId)
            .into_tuple::<(i32, i64)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();
        let rows = community::Entity::find().order_by_asc(community::Column::Id).all(&self.db).await?;
        Ok(rows
            .into_iter()
            .map(|m| {
                let n = counts.get(&m.id).copied().unwrap_or(0).max(0) as u64;
                (Community::from(m), n)
            })
            .collect())
    }

    async fn find_community(&self, id: i32) -> Result<Option<Community>, RepositoryError> {
        Ok(community::Entity::find_by_id(id).one(&self.db).await?.map(Community::from))
    }

    async fn find_community_by_name(&self, name: &str) -> Result<Option<Community>, RepositoryError> {
        let res = community::Entity::find()
            .filter(community::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(res.map(Community::from))
    }

    async fn insert_community(&self, data: CommunityData) -> Result<Community, RepositoryError> {
        let am = community::ActiveModel {
            name: Set(data.name),
            description: Set(data.description),
            admin_login: Set(data.admin_login),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        Ok(am.insert(&self.db).await?.into())
    }

    async fn update_community(&self, id: i32, data: CommunityData) -> Result<Community, RepositoryError> {
        let am = community::ActiveModel {
            id: Set(id),
            name: Set(data.name),
            description: Set(data.description),
            admin_login: Set(data.admin_login),
            ..Default::default()
        };
        Ok(am.update(&self.db).await?.into())
    }

    async fn delete_community(&self, id: i32) -> Result<bool, RepositoryError> {
        let res = community::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn find_members(&self, community_id: i32) -> Result<Vec<Member>, RepositoryError> {
        let rows = community_membership::Entity::find()
            .filter(community_membership::Column::CommunityId.eq(community_id))
            .order_by_asc(community_membership::Column::UserLogin)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|m| Member { login: m.user_login }).collect())
    }

    async fn find_member(&self, login: &str) -> Result<Option<Member>, RepositoryError> {
        let res = community_member::Entity::find_by_id(login.to_string()).one(&self.db).await?;
        Ok(res.map(|m| Member { login: m.login }))
    }

    async fn is_member(&self, community_id: i32, login: &str) -> Result<bool, RepositoryError> {
        let res = community_membership::Entity::find_by_id((community_id, login.to_string()))
            .one(&self.db)
            .await?;
        Ok(res.is_some())
    }

    async fn subscribe(&self, community_id: i32, login: &str) -> Result<Member, RepositoryError> {
        let txn = self.db.begin().await?;
        if community_member::Entity::find_by_id(login.to_string()).one(&txn).await?.is_none() {
            community_member::ActiveModel { login: Set(login.to_string()) }.insert(&txn).await?;
        }
        community_membership::ActiveModel { community_id: Set(community_id), user_login: Set(login.to_string()) }
            .insert(&txn)
            .await?;
        txn.commit().await?;
        Ok(Member { login: login.to_string() })
    }

    async fn unsubscribe(&self, community_id: i32, login: &str) -> Result<bool, RepositoryError> {
        let txn = self.db.begin().await?;
        let res = community_membership::Entity::delete_by_id((community_id, login.to_string()))
            .exec(&txn)
            .await?;
        if res.rows_affected > 0 {
            let remaining = community_membership::Entity::find()
                .filter(community_membership::Column::UserLogin.eq(login))
                .one(&txn)
                .await?;
            if remaining.is_none() {
                community_member::Entity::delete_by_id(login.to_string()).exec(&txn).await?;
            }
        }
        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }

    async fn find_posts(&self, community_id: i32) -> Result<Vec<Post>, RepositoryError> {
        let rows = post::Entity::find()
            .filter(post::Column::CommunityId.eq(community_id))
            .order_by_asc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_post(&self, id: i32) -> Result<Option<Post>, RepositoryError> {
        Ok(post::Entity::find_by_id(id).one(&self.db).await?.map(Post::from))
    }

    async fn insert_post(&self, community_id: i32, data: PostData) -> Result<Post, RepositoryError> {
        let am = post::ActiveModel {
            message: Set(data.message),
            created_at: Set(Utc::now().into()),
            user_login: Set(data.user_login),
            community_id: Set(community_id),
            ..Default::default()
        };
        Ok(am.insert(&self.db).await?.into())
    }

    async fn update_post(&self, id: i32, data: PostData) -> Result<Post, RepositoryError> {
        let am = post::ActiveModel {
            id: Set(id),
            message: Set(data.message),
            user_login: Set(data.user_login),
            ..Default::default()
        };
        Ok(am.update(&self.db).await?.into())
    }

    async fn delete_post(&self, id: i32) -> Result<bool, RepositoryError> {
        Ok(post::Entity::delete_by_id(id).exec(&self.db).await?.rows_affected > 0)
    }

    async fn find_comments(&self, post_id: i32) -> Result<Vec<Comment>, RepositoryError> {
        let rows = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn find_comment(&self, id: i32) -> Result<Option<Comment>, RepositoryError> {
        Ok(comment::Entity::find_by_id(id).one(&self.db).await?.map(Comment::from))
    }

    async fn insert_comment(&self, post_id: i32, data: CommentData) -> Result<Comment, RepositoryError> {
        let am = comment::ActiveModel {
            message: Set(data.message),
            created_at: Set(Utc::now().into()),
            user_login: Set(data.user_login),
            post_id: Set(post_id),
            ..Default::default()
        };
        Ok(am.insert(&self.db).await?.into())
    }

    async fn update_comment(&self, id: i32, data: CommentData) -> Result<Comment, RepositoryError> {
        let am = comment::ActiveModel {
            id: Set(id),
            message: Set(data.message),
            user_login: Set(data.user_login),
            ..Default::default()
        };
        Ok(am.update(&self.db).await?.into())
    }

    async fn delete_comment(&self, id: i32) -> Result<bool, RepositoryError> {
        Ok(comment::Entity::delete_by_id(id).exec(&self.db).await?.rows_affected > 0)
    }

    async fn find_post_likes(&self, post_id: i32) -> Result<Vec<PostLike>, RepositoryError> {
        let rows = post_like::Entity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .order_by_asc(post_like::Column::CreatedAt)
            .order_by_asc(post_like::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(PostLike::from).collect())
    }

    async fn find_post_like(&self, id: i32) -> Result<Option<PostLike>, RepositoryError> {
        Ok(post_like::Entity::find_by_id(id).one(&self.db).await?.map(PostLike::from))
    }

    async fn insert_post_like(&self, post_id: i32, user_login: &str) -> Result<PostLike, RepositoryError> {
        let am = post_like::ActiveModel {
            created_at: Set(Utc::now().into()),
            user_login: Set(user_login.to_string()),
            post_id: Set(post_id),
            ..Default::default()
        };
        Ok(am.insert(&self.db).await?.into())
    }

    async fn delete_post_like(&self, id: i32) -> Result<bool, RepositoryError> {
        Ok(post_like::Entity::delete_by_id(id).exec(&self.db).await?.rows_affected > 0)
    }

    async fn find_comment_likes(&self, comment_id: i32) -> Result<Vec<CommentLike>, RepositoryError> {
        let rows = comment_like::Entity::find()
            .filter(comment_like::Column::CommentId.eq(comment_id))
            .order_by_asc(comment_like::Column::CreatedAt)
            .order_by_asc(comment_like::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(CommentLike::from).collect())
    }

    async fn find_comment_like(&self, id: i32) -> Result<Option<CommentLike>, RepositoryError> {
        Ok(comment_like::Entity::find_by_id(id).one(&self.db).await?.map(CommentLike::from))
    }

    async fn insert_comment_like(&self, comment_id: i32, user_login: &str) -> Result<CommentLike, RepositoryError> {
        let am = comment_like::ActiveModel {
            created_at: Set(Utc::now().into()),
            user_login: Set(user_login.to_string()),
            comment_id: Set(comment_id),
            ..Default::default()
        };
        Ok(am.insert(&self.db).await?.into())
    }

    async fn delete_comment_like(&self, id: i32) -> Result<bool, RepositoryError> {
        Ok(comment_like::Entity::delete_by_id(id).exec(&self.db).await?.rows_affected > 0)
    }
}
