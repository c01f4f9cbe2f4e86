//! Create `post` table with FK to `community`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(pk_auto(Post::Id))
                    .col(text(Post::Message).not_null())
                    .col(timestamp_with_time_zone(Post::CreatedAt).not_null())
                    .col(string_len(Post::UserLogin, 64).not_null())
                    .col(integer(Post::CommunityId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_community")
                            .from(Post::Table, Post::CommunityId)
                            .to(Community::Table, Community::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Post::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Post { Table, Id, Message, CreatedAt, UserLogin, CommunityId }

#[derive(DeriveIden)]
enum Community { Table, Id }
