use std::str::FromStr;

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};

use models::user_account;

use crate::auth::domain::Role;
use crate::errors::RepositoryError;
use crate::users::domain::{PersonalData, User};
use crate::users::repository::UserRepository;

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_domain(m: user_account::Model) -> Result<User, RepositoryError> {
    let role = Role::from_str(&m.role).map_err(RepositoryError::Db)?;
    Ok(User {
        login: m.login,
        email: m.email,
        password_hash: m.password_hash,
        role,
        is_blocked: m.is_blocked,
        personal_data: PersonalData { name: m.name, phone: m.phone, birthday: m.birthday },
        created_at: m.created_at.into(),
    })
}

fn to_active(u: &User) -> user_account::ActiveModel {
    user_account::ActiveModel {
        login: Set(u.login.clone()),
        email: Set(u.email.clone()),
        password_hash: Set(u.password_hash.clone()),
        role: Set(u.role.as_str().to_string()),
        is_blocked: Set(u.is_blocked),
        name: Set(u.personal_data.name.clone()),
        phone: Set(u.personal_data.phone.clone()),
        birthday: Set(u.personal_data.birthday),
        created_at: Set(u.created_at.into()),
    }
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = user_account::Entity::find()
            .order_by_asc(user_account::Column::Login)
            .all(&self.db)
            .await?;
        rows.into_iter().map(to_domain).collect()
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
        let res = user_account::Entity::find_by_id(login.to_string()).one(&self.db).await?;
        res.map(to_domain).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let res = user_account::Entity::find()
            .filter(user_account::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        res.map(to_domain).transpose()
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(user_account::Entity::find().count(&self.db).await?)
    }

    async fn insert(&self, user: User) -> Result<User, RepositoryError> {
        // 主键冲突在各数据库上的错误码不一致，这里先行判断
        if user_account::Entity::find_by_id(user.login.clone()).one(&self.db).await?.is_some() {
            return Err(RepositoryError::Conflict(format!("login {}", user.login)));
        }
        let saved = to_active(&user).insert(&self.db).await?;
        to_domain(saved)
    }

    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let updated = to_active(&user).update(&self.db).await?;
        to_domain(updated)
    }

    async fn delete_by_login(&self, login: &str) -> Result<bool, RepositoryError> {
        let res = user_account::Entity::delete_by_id(login.to_string()).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sqlite_db;
    use chrono::{NaiveDate, Utc};

    fn user(login: &str, email: &str) -> User {
        User {
            login: login.into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            role: Role::User,
            is_blocked: false,
            personal_data: PersonalData {
                name: "Name".into(),
                phone: "+1".into(),
                birthday: NaiveDate::from_ymd_opt(1985, 3, 4).unwrap(),
            },
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_find_update_delete() -> anyhow::Result<()> {
        let repo = SeaOrmUserRepository::new(sqlite_db().await?);
        repo.insert(user("bob", "bob@example.com")).await?;
        repo.insert(user("amy", "amy@example.com")).await?;

        let all = repo.find_all().await?;
        assert_eq!(all.iter().map(|u| u.login.as_str()).collect::<Vec<_>>(), vec!["amy", "bob"]);
        assert_eq!(repo.count().await?, 2);
        assert_eq!(repo.find_by_email("bob@example.com").await?.map(|u| u.login), Some("bob".to_string()));

        let mut bob = repo.find_by_login("bob").await?.unwrap();
        bob.is_blocked = true;
        bob.role = Role::Admin;
        repo.update(bob).await?;
        let bob = repo.find_by_login("bob").await?.unwrap();
        assert!(bob.is_blocked);
        assert_eq!(bob.role, Role::Admin);

        assert!(repo.delete_by_login("bob").await?);
        assert!(!repo.delete_by_login("bob").await?);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() -> anyhow::Result<()> {
        let repo = SeaOrmUserRepository::new(sqlite_db().await?);
        repo.insert(user("bob", "same@example.com")).await?;
        let err = repo.insert(user("other", "same@example.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        Ok(())
    }
}
