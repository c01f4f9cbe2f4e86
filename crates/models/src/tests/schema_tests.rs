use anyhow::Result;
use chrono::Utc;
use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set, SqlErr};

use crate::db::{connect_with_config, test_connection};
use crate::{comment, comment_like, community, community_member, community_membership, post, post_like, user_account};

async fn setup_sqlite() -> Result<DatabaseConnection> {
    let db = connect_with_config(&DatabaseConfig::sqlite_memory()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn insert_community(db: &DatabaseConnection, name: &str) -> Result<community::Model> {
    let am = community::ActiveModel {
        name: Set(name.to_string()),
        description: Set("about rust".into()),
        admin_login: Set("alice".into()),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

#[tokio::test]
async fn sqlite_connection_is_usable() -> Result<()> {
    let db = setup_sqlite().await?;
    test_connection(&db).await?;
    Ok(())
}

#[tokio::test]
async fn deleting_community_cascades_to_children() -> Result<()> {
    let db = setup_sqlite().await?;
    let c = insert_community(&db, "rustaceans").await?;

    community_member::ActiveModel { login: Set("bob".into()) }.insert(&db).await?;
    community_membership::ActiveModel { community_id: Set(c.id), user_login: Set("bob".into()) }
        .insert(&db)
        .await?;

    let p = post::ActiveModel {
        message: Set("hello".into()),
        created_at: Set(Utc::now().into()),
        user_login: Set("bob".into()),
        community_id: Set(c.id),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    let cm = comment::ActiveModel {
        message: Set("hi bob".into()),
        created_at: Set(Utc::now().into()),
        user_login: Set("bob".into()),
        post_id: Set(p.id),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    post_like::ActiveModel {
        created_at: Set(Utc::now().into()),
        user_login: Set("bob".into()),
        post_id: Set(p.id),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    comment_like::ActiveModel {
        created_at: Set(Utc::now().into()),
        user_login: Set("bob".into()),
        comment_id: Set(cm.id),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    community::Entity::delete_by_id(c.id).exec(&db).await?;

    assert_eq!(post::Entity::find().count(&db).await?, 0);
    assert_eq!(comment::Entity::find().count(&db).await?, 0);
    assert_eq!(post_like::Entity::find().count(&db).await?, 0);
    assert_eq!(comment_like::Entity::find().count(&db).await?, 0);
    assert_eq!(community_membership::Entity::find().count(&db).await?, 0);
    // member rows are managed by the membership write path, not by cascade
    assert_eq!(community_member::Entity::find().count(&db).await?, 1);
    Ok(())
}

#[tokio::test]
async fn community_name_is_unique() -> Result<()> {
    let db = setup_sqlite().await?;
    insert_community(&db, "dup").await?;
    let err = insert_community(&db, "dup").await.unwrap_err();
    let db_err = err.downcast_ref::<sea_orm::DbErr>().expect("DbErr");
    assert!(matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))));
    Ok(())
}

#[tokio::test]
async fn user_account_round_trips_birthday() -> Result<()> {
    let db = setup_sqlite().await?;
    let birthday = chrono::NaiveDate::from_ymd_opt(1990, 5, 17).unwrap();
    user_account::ActiveModel {
        login: Set("carol".into()),
        email: Set("carol@example.com".into()),
        password_hash: Set("$argon2id$stub".into()),
        role: Set("USER".into()),
        is_blocked: Set(false),
        name: Set("Carol".into()),
        phone: Set("+100".into()),
        birthday: Set(birthday),
        created_at: Set(Utc::now().into()),
    }
    .insert(&db)
    .await?;

    let found = user_account::Entity::find_by_id("carol".to_string()).one(&db).await?.unwrap();
    assert_eq!(found.birthday, birthday);
    assert!(!found.is_blocked);
    Ok(())
}
