use async_trait::async_trait;

use super::domain::User;
use crate::errors::RepositoryError;

/// Repository abstraction for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;

    async fn insert(&self, user: User) -> Result<User, RepositoryError>;
    /// Overwrites the row identified by `user.login`.
    async fn update(&self, user: User) -> Result<User, RepositoryError>;
    /// Returns whether a row was deleted.
    async fn delete_by_login(&self, login: &str) -> Result<bool, RepositoryError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<BTreeMap<String, User>>, // key: login
        down: AtomicBool,
    }

    impl MockUserRepository {
        /// Make every subsequent call fail as if the database were unreachable.
        pub fn set_down(&self, down: bool) { self.down.store(down, Ordering::SeqCst); }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(RepositoryError::Db("connection refused".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
            self.check()?;
            Ok(self.users.lock().unwrap().values().cloned().collect())
        }

        async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
            self.check()?;
            Ok(self.users.lock().unwrap().get(login).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
            self.check()?;
            Ok(self.users.lock().unwrap().values().find(|u| u.email == email).cloned())
        }

        async fn count(&self) -> Result<u64, RepositoryError> {
            self.check()?;
            Ok(self.users.lock().unwrap().len() as u64)
        }

        async fn insert(&self, user: User) -> Result<User, RepositoryError> {
            self.check()?;
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&user.login) || users.values().any(|u| u.email == user.email) {
                return Err(RepositoryError::Conflict("user_account".into()));
            }
            users.insert(user.login.clone(), user.clone());
            Ok(user)
        }

        async fn update(&self, user: User) -> Result<User, RepositoryError> {
            self.check()?;
            let mut users = self.users.lock().unwrap();
            if users.values().any(|u| u.email == user.email && u.login != user.login) {
                return Err(RepositoryError::Conflict("user_account.email".into()));
            }
            match users.get_mut(&user.login) {
                Some(slot) => {
                    *slot = user.clone();
                    Ok(user)
                }
                None => Err(RepositoryError::Db("record not updated".into())),
            }
        }

        async fn delete_by_login(&self, login: &str) -> Result<bool, RepositoryError> {
            self.check()?;
            Ok(self.users.lock().unwrap().remove(login).is_some())
        }
    }
}
