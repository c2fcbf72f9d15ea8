//! The fixed statement set behind the sqlx backend.
//!
//! Every statement is a plain constant with positional parameters, the same
//! text for PostgreSQL and SQLite. Only the table definition differs between
//! the engines.

use chrono::{DateTime, Utc};

use crate::{
    db::{Engine, Pool},
    types::author::{Author, AuthorId, NewAuthor},
};

pub const CREATE_TABLE_POSTGRES: &str = r#"
    CREATE TABLE IF NOT EXISTS authors (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        bio TEXT,
        email TEXT UNIQUE,
        date_of_birth TIMESTAMPTZ
    );"#;

pub const CREATE_TABLE_SQLITE: &str = r#"
    CREATE TABLE IF NOT EXISTS authors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        bio TEXT,
        email TEXT UNIQUE,
        date_of_birth TEXT
    );"#;

pub const CREATE_AUTHOR: &str = r#"
    INSERT INTO authors (name, bio, email, date_of_birth)
    VALUES ($1, $2, $3, $4)
    RETURNING id"#;

pub const GET_AUTHOR: &str = r#"
    SELECT id, name, bio, email, date_of_birth FROM authors
    WHERE id = $1"#;

pub const LIST_AUTHORS: &str = r#"
    SELECT id, name, bio, email, date_of_birth FROM authors
    ORDER BY name, id"#;

pub const UPDATE_AUTHOR: &str = r#"
    UPDATE authors
    SET name = $2,
        bio = $3,
        email = $4,
        date_of_birth = $5
    WHERE id = $1"#;

pub const DELETE_AUTHOR: &str = r#"
    DELETE FROM authors
    WHERE id = $1"#;

pub const DELETE_ALL_AUTHORS: &str = "DELETE FROM authors";

pub const GET_AUTHORS_BY_BIRTHDATE_RANGE: &str = r#"
    SELECT id, name, bio, email, date_of_birth FROM authors
    WHERE date_of_birth BETWEEN $1 AND $2
    ORDER BY date_of_birth, id"#;

/// Runs `$body` with `$conn` bound to whichever pool is active. The body is
/// type checked once per engine.
macro_rules! on_pool {
    ($pool:expr, $conn:ident => $body:expr) => {
        match $pool {
            Pool::Postgres($conn) => $body,
            Pool::Sqlite($conn) => $body,
        }
    };
}

#[derive(Debug, Clone)]
pub struct Queries {
    pool: Pool,
}

impl Queries {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub async fn create_table(&self) -> sqlx::Result<()> {
        let ddl = match self.pool.engine() {
            Engine::Postgres => CREATE_TABLE_POSTGRES,
            Engine::Sqlite => CREATE_TABLE_SQLITE,
        };
        on_pool!(&self.pool, conn => sqlx::query(ddl).execute(conn).await.map(|_| ()))
    }

    pub async fn create_author(&self, arg: &NewAuthor) -> sqlx::Result<AuthorId> {
        on_pool!(&self.pool, conn => {
            sqlx::query_scalar(CREATE_AUTHOR)
                .bind(&arg.name)
                .bind(&arg.bio)
                .bind(&arg.email)
                .bind(arg.date_of_birth)
                .fetch_one(conn)
                .await
        })
    }

    pub async fn get_author(&self, id: AuthorId) -> sqlx::Result<Option<Author>> {
        on_pool!(&self.pool, conn => {
            sqlx::query_as(GET_AUTHOR)
                .bind(id)
                .fetch_optional(conn)
                .await
        })
    }

    pub async fn list_authors(&self) -> sqlx::Result<Vec<Author>> {
        on_pool!(&self.pool, conn => sqlx::query_as(LIST_AUTHORS).fetch_all(conn).await)
    }

    /// Returns the number of rows touched.
    pub async fn update_author(&self, id: AuthorId, arg: &NewAuthor) -> sqlx::Result<u64> {
        on_pool!(&self.pool, conn => {
            sqlx::query(UPDATE_AUTHOR)
                .bind(id)
                .bind(&arg.name)
                .bind(&arg.bio)
                .bind(&arg.email)
                .bind(arg.date_of_birth)
                .execute(conn)
                .await
                .map(|res| res.rows_affected())
        })
    }

    /// Returns the number of rows removed.
    pub async fn delete_author(&self, id: AuthorId) -> sqlx::Result<u64> {
        on_pool!(&self.pool, conn => {
            sqlx::query(DELETE_AUTHOR)
                .bind(id)
                .execute(conn)
                .await
                .map(|res| res.rows_affected())
        })
    }

    pub async fn delete_all_authors(&self) -> sqlx::Result<u64> {
        on_pool!(&self.pool, conn => {
            sqlx::query(DELETE_ALL_AUTHORS)
                .execute(conn)
                .await
                .map(|res| res.rows_affected())
        })
    }

    pub async fn get_authors_by_birthdate_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> sqlx::Result<Vec<Author>> {
        on_pool!(&self.pool, conn => {
            sqlx::query_as(GET_AUTHORS_BY_BIRTHDATE_RANGE)
                .bind(start)
                .bind(end)
                .fetch_all(conn)
                .await
        })
    }
}
