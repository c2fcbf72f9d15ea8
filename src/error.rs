use thiserror::Error;

use crate::types::author::AuthorId;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the repositories and the setup around them.
///
/// Both backends translate their driver errors into these variants, so the
/// runner can treat them the same way regardless of which one produced them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("author {id} not found")]
    NotFound { id: AuthorId },

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("database error: {0}")]
    Database(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::ConstraintViolation(db_err.message().to_string())
            }
            sqlx::Error::Configuration(e) => Error::Configuration(e.to_string()),
            sqlx::Error::Io(e) => Error::Connection(e.to_string()),
            sqlx::Error::Tls(e) => Error::Connection(e.to_string()),
            e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
                Error::Connection(e.to_string())
            }
            e => Error::Database(e.to_string()),
        }
    }
}

impl From<sea_orm::DbErr> for Error {
    fn from(err: sea_orm::DbErr) -> Self {
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
            return Error::ConstraintViolation(msg);
        }
        match err {
            sea_orm::DbErr::Conn(e) => Error::Connection(e.to_string()),
            sea_orm::DbErr::ConnectionAcquire(e) => Error::Connection(e.to_string()),
            e => Error::Database(e.to_string()),
        }
    }
}
