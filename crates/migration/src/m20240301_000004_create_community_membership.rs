//! Create `community_membership` join table between communities and members.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CommunityMembership::Table)
                    .if_not_exists()
                    .col(integer(CommunityMembership::CommunityId).not_null())
                    .col(string_len(CommunityMembership::UserLogin, 64).not_null())
                    .primary_key(
                        Index::create()
                            .col(CommunityMembership::CommunityId)
                            .col(CommunityMembership::UserLogin),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_membership_community")
                            .from(CommunityMembership::Table, CommunityMembership::CommunityId)
                            .to(Community::Table, Community::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_membership_member")
                            .from(CommunityMembership::Table, CommunityMembership::UserLogin)
                            .to(CommunityMember::Table, CommunityMember::Login)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CommunityMembership::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CommunityMembership { Table, CommunityId, UserLogin }

#[derive(DeriveIden)]
enum Community { Table, Id }

#[derive(DeriveIden)]
enum CommunityMember { Table, Login }
