//! Create `post_like` and `comment_like` tables.
//!
//! Both cascade with their target.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostLike::Table)
                    .if_not_exists()
                    .col(pk_auto(PostLike::Id))
                    .col(timestamp_with_time_zone(PostLike::CreatedAt).not_null())
                    .col(string_len(PostLike::UserLogin, 64).not_null())
                    .col(integer(PostLike::PostId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_like_post")
                            .from(PostLike::Table, PostLike::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CommentLike::Table)
                    .if_not_exists()
                    .col(pk_auto(CommentLike::Id))
                    .col(timestamp_with_time_zone(CommentLike::CreatedAt).not_null())
                    .col(string_len(CommentLike::UserLogin, 64).not_null())
                    .col(integer(CommentLike::CommentId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_like_comment")
                            .from(CommentLike::Table, CommentLike::CommentId)
                            .to(Comment::Table, Comment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CommentLike::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(PostLike::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PostLike { Table, Id, CreatedAt, UserLogin, PostId }

#[derive(DeriveIden)]
enum CommentLike { Table, Id, CreatedAt, UserLogin, CommentId }

#[derive(DeriveIden)]
enum Post { Table, Id }

#[derive(DeriveIden)]
enum Comment { Table, Id }
