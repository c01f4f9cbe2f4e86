//! Migrator registering the user-service and community-service tables in
//! dependency order. Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_user_account;
mod m20240301_000002_create_community;
mod m20240301_000003_create_community_member;
mod m20240301_000004_create_community_membership;
mod m20240301_000005_create_post;
mod m20240301_000006_create_comment;
mod m20240301_000007_create_likes;
mod m20240301_000010_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_user_account::Migration),
            Box::new(m20240301_000002_create_community::Migration),
            Box::new(m20240301_000003_create_community_member::Migration),
            Box::new(m20240301_000004_create_community_membership::Migration),
            Box::new(m20240301_000005_create_post::Migration),
            Box::new(m20240301_000006_create_comment::Migration),
            Box::new(m20240301_000007_create_likes::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000010_add_indexes::Migration),
        ]
    }
}
