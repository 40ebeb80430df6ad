use anyhow::Context;
use thiserror::Error;
use tracing::{error, instrument, warn};

use crate::users::{
    domain::{NewUser, ProfileUpdate, User},
    password::{hash_password, verify_password},
    repo::{RepoError, UserRepository},
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("email already registered")]
    DuplicateEmail,
    /// Unknown email and wrong password both end up here.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::DuplicateEmail => ServiceError::DuplicateEmail,
            RepoError::UserNotFound => ServiceError::UserNotFound,
            other => ServiceError::Internal(anyhow::Error::new(other)),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Registers a new account and returns its id.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> ServiceResult<i64> {
        let plain = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || hash_password(&plain))
            .await
            .context("password hashing task")??;

        let id = self
            .repo
            .create(&NewUser {
                email: email.to_owned(),
                password: hash,
            })
            .await?;
        Ok(id)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<User> {
        let user = match self.repo.find_by_email(email).await {
            Ok(user) => user,
            Err(RepoError::UserNotFound) => {
                warn!("login unknown email");
                return Err(ServiceError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        let plain = password.to_owned();
        let hash = user.password.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
            .await
            .context("password verification task")?;

        match verified {
            Ok(true) => Ok(user),
            Ok(false) => {
                warn!(user_id = user.id, "login invalid password");
                Err(ServiceError::InvalidCredentials)
            }
            Err(e) => {
                // an unreadable stored hash can never match
                error!(error = %e, user_id = user.id, "stored password hash is malformed");
                Err(ServiceError::InvalidCredentials)
            }
        }
    }

    /// Updates nickname, birthday and about-me together.
    #[instrument(skip(self, update))]
    pub async fn edit_non_sensitive(&self, id: i64, update: ProfileUpdate) -> ServiceResult<()> {
        self.repo.update_non_sensitive(id, &update).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, id: i64) -> ServiceResult<User> {
        Ok(self.repo.find_by_id(id).await?)
    }
}
