//! In-memory user store for development and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::dao::{now_millis, DaoError, DaoResult, UserDao, UserEntity};

#[derive(Default)]
struct Inner {
    rows: BTreeMap<i64, UserEntity>,
    last_id: i64,
}

/// Mirrors the `users` table: ids start at 1 and are never reused, email is unique.
#[derive(Default)]
pub struct MemoryUserDao {
    inner: RwLock<Inner>,
}

impl MemoryUserDao {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDao for MemoryUserDao {
    async fn insert(&self, mut user: UserEntity) -> DaoResult<i64> {
        let mut inner = self.inner.write().await;
        if inner.rows.values().any(|row| row.email == user.email) {
            return Err(DaoError::DuplicateEmail);
        }
        inner.last_id += 1;
        let now = now_millis();
        user.id = inner.last_id;
        user.create_time = now;
        user.update_time = now;
        inner.rows.insert(user.id, user);
        Ok(inner.last_id)
    }

    async fn find_by_email(&self, email: &str) -> DaoResult<UserEntity> {
        let inner = self.inner.read().await;
        inner
            .rows
            .values()
            .find(|row| row.email == email)
            .cloned()
            .ok_or(DaoError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> DaoResult<UserEntity> {
        let inner = self.inner.read().await;
        inner.rows.get(&id).cloned().ok_or(DaoError::NotFound)
    }

    async fn update_profile(
        &self,
        id: i64,
        nickname: &str,
        birthday: i64,
        about_me: &str,
    ) -> DaoResult<()> {
        let mut inner = self.inner.write().await;
        let row = inner.rows.get_mut(&id).ok_or(DaoError::NotFound)?;
        row.update_time = now_millis();
        row.nickname = nickname.to_string();
        row.birthday = birthday;
        row.about_me = about_me.to_string();
        Ok(())
    }
}
