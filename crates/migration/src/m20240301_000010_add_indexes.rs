use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Membership: lookups by login when unsubscribing
        manager
            .create_index(
                Index::create()
                    .name("idx_membership_login")
                    .table(CommunityMembership::Table)
                    .col(CommunityMembership::UserLogin)
                    .to_owned(),
            )
            .await?;

        // Post: index on community_id
        manager
            .create_index(
                Index::create()
                    .name("idx_post_community")
                    .table(Post::Table)
                    .col(Post::CommunityId)
                    .to_owned(),
            )
            .await?;

        // Comment: index on post_id
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_post")
                    .table(Comment::Table)
                    .col(Comment::PostId)
                    .to_owned(),
            )
            .await?;

        // Likes: one per (target, user)
        manager
            .create_index(
                Index::create()
                    .name("uniq_post_like_user")
                    .table(PostLike::Table)
                    .col(PostLike::PostId)
                    .col(PostLike::UserLogin)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uniq_comment_like_user")
                    .table(CommentLike::Table)
                    .col(CommentLike::CommentId)
                    .col(CommentLike::UserLogin)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_membership_login").table(CommunityMembership::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_post_community").table(Post::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_comment_post").table(Comment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_post_like_user").table(PostLike::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_comment_like_user").table(CommentLike::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CommunityMembership { Table, UserLogin }

#[derive(DeriveIden)]
enum Post { Table, CommunityId }

#[derive(DeriveIden)]
enum Comment { Table, PostId }

#[derive(DeriveIden)]
enum PostLike { Table, PostId, UserLogin }

#[derive(DeriveIden)]
enum CommentLike { Table, CommentId, UserLogin }
