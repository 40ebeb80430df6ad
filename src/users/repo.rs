use std::sync::Arc;

use thiserror::Error;
use time::{Date, OffsetDateTime};

use crate::users::{
    dao::{DaoError, UserDao, UserEntity},
    domain::{NewUser, ProfileUpdate, User},
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("duplicate email")]
    DuplicateEmail,
    #[error("user not found")]
    UserNotFound,
    #[error("stored timestamp out of range: {0}")]
    InvalidTimestamp(i64),
    #[error("store error: {0}")]
    Store(#[source] sqlx::Error),
}

impl From<DaoError> for RepoError {
    fn from(e: DaoError) -> Self {
        match e {
            DaoError::DuplicateEmail => RepoError::DuplicateEmail,
            DaoError::NotFound => RepoError::UserNotFound,
            DaoError::Database(inner) => RepoError::Store(inner),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Maps between `users` rows and [`User`]. Holds no business rules.
#[derive(Clone)]
pub struct UserRepository {
    dao: Arc<dyn UserDao>,
}

impl UserRepository {
    pub fn new(dao: Arc<dyn UserDao>) -> Self {
        Self { dao }
    }

    pub async fn create(&self, user: &NewUser) -> RepoResult<i64> {
        let id = self
            .dao
            .insert(UserEntity {
                email: user.email.clone(),
                password: user.password.clone(),
                ..Default::default()
            })
            .await?;
        Ok(id)
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<User> {
        let entity = self.dao.find_by_email(email).await?;
        to_domain(entity)
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<User> {
        let entity = self.dao.find_by_id(id).await?;
        to_domain(entity)
    }

    pub async fn update_non_sensitive(&self, id: i64, update: &ProfileUpdate) -> RepoResult<()> {
        self.dao
            .update_profile(
                id,
                &update.nickname,
                date_to_millis(update.birthday),
                &update.about_me,
            )
            .await?;
        Ok(())
    }
}

fn to_domain(entity: UserEntity) -> RepoResult<User> {
    Ok(User {
        id: entity.id,
        email: entity.email,
        password: entity.password,
        create_time: millis_to_datetime(entity.create_time)?,
        nickname: entity.nickname,
        birthday: millis_to_datetime(entity.birthday)?.date(),
        about_me: entity.about_me,
    })
}

fn millis_to_datetime(ms: i64) -> RepoResult<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .map_err(|_| RepoError::InvalidTimestamp(ms))
}

// UTC midnight, so the date survives a round trip regardless of server timezone.
fn date_to_millis(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp() * 1000
}
