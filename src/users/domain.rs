use std::fmt;

use thiserror::Error;
use time::{macros::format_description, Date, OffsetDateTime};

/// A registered account as the service layer sees it.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password: String, // argon2 PHC string, never plaintext
    pub create_time: OffsetDateTime, // UTC
    pub nickname: String,
    pub birthday: Date,
    pub about_me: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("create_time", &self.create_time)
            .field("nickname", &self.nickname)
            .field("birthday", &self.birthday)
            .field("about_me", &self.about_me)
            .finish()
    }
}

/// Input for creating an account. `password` already holds the hash.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
}

/// The non-sensitive fields that can be edited as a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub nickname: String,
    pub birthday: Date,
    pub about_me: String,
}

#[derive(Debug, Error)]
pub enum BirthdayError {
    #[error("birthday must be YYYY-MM-DD")]
    Shape,
    #[error(transparent)]
    Parse(#[from] time::error::Parse),
}

/// Parses a plain `YYYY-MM-DD` calendar date.
pub fn parse_birthday(input: &str) -> Result<Date, BirthdayError> {
    // `[year]` alone would also take a leading sign
    let plain = input.len() == 10
        && input.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !plain {
        return Err(BirthdayError::Shape);
    }
    Ok(Date::parse(input, format_description!("[year]-[month]-[day]"))?)
}

pub fn format_birthday(date: Date) -> Result<String, time::error::Format> {
    date.format(format_description!("[year]-[month]-[day]"))
}
