use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("duplicate email")]
    DuplicateEmail,
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type DaoResult<T> = Result<T, DaoError>;

/// Row of the `users` table. Timestamps and birthday are epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub create_time: i64,
    pub update_time: i64,
    pub nickname: String,
    pub birthday: i64,
    pub about_me: String,
}

/// Persistence seam for user rows.
#[async_trait]
pub trait UserDao: Send + Sync {
    /// Stores a new row and returns the generated id. `create_time` and
    /// `update_time` are overwritten with the current time.
    async fn insert(&self, user: UserEntity) -> DaoResult<i64>;
    async fn find_by_email(&self, email: &str) -> DaoResult<UserEntity>;
    async fn find_by_id(&self, id: i64) -> DaoResult<UserEntity>;
    /// Touches only nickname, birthday, about_me and update_time.
    async fn update_profile(
        &self,
        id: i64,
        nickname: &str,
        birthday: i64,
        about_me: &str,
    ) -> DaoResult<()>;
}

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

fn map_insert_error(e: sqlx::Error) -> DaoError {
    match e {
        sqlx::Error::Database(ref db_err)
            if db_err.is_unique_violation()
                && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) =>
        {
            DaoError::DuplicateEmail
        }
        other => DaoError::Database(other),
    }
}

pub(crate) fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[derive(Clone)]
pub struct PgUserDao {
    db: PgPool,
}

impl PgUserDao {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDao for PgUserDao {
    async fn insert(&self, user: UserEntity) -> DaoResult<i64> {
        let now = now_millis();
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email, password, create_time, update_time, nickname, birthday, about_me)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.password)
        .bind(now)
        .bind(now)
        .bind(&user.nickname)
        .bind(user.birthday)
        .bind(&user.about_me)
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)?;
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> DaoResult<UserEntity> {
        sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, password, create_time, update_time, nickname, birthday, about_me
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(DaoError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> DaoResult<UserEntity> {
        sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, password, create_time, update_time, nickname, birthday, about_me
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(DaoError::NotFound)
    }

    async fn update_profile(
        &self,
        id: i64,
        nickname: &str,
        birthday: i64,
        about_me: &str,
    ) -> DaoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET update_time = $2, nickname = $3, birthday = $4, about_me = $5
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(now_millis())
        .bind(nickname)
        .bind(birthday)
        .bind(about_me)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }
}
