//! Create `community` table.
//!
//! `admin_login` references a user-service login and is intentionally not a foreign key.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Community::Table)
                    .if_not_exists()
                    .col(pk_auto(Community::Id))
                    .col(string_len(Community::Name, 128).unique_key().not_null())
                    .col(text(Community::Description).not_null())
                    .col(string_len(Community::AdminLogin, 64).not_null())
                    .col(timestamp_with_time_zone(Community::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Community::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Community { Table, Id, Name, Description, AdminLogin, CreatedAt }
