//! Create `user_account` table (user-service).
//!
//! `login` is the natural primary key; personal data is stored inline.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserAccount::Table)
                    .if_not_exists()
                    .col(string_len(UserAccount::Login, 64).primary_key())
                    .col(string_len(UserAccount::Email, 255).unique_key().not_null())
                    .col(string_len(UserAccount::PasswordHash, 255).not_null())
                    .col(string_len(UserAccount::Role, 16).not_null())
                    .col(boolean(UserAccount::IsBlocked).default(false).not_null())
                    .col(string_len(UserAccount::Name, 128).not_null())
                    .col(string_len(UserAccount::Phone, 32).not_null())
                    .col(date(UserAccount::Birthday).not_null())
                    .col(timestamp_with_time_zone(UserAccount::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserAccount::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserAccount { Table, Login, Email, PasswordHash, Role, IsBlocked, Name, Phone, Birthday, CreatedAt }
