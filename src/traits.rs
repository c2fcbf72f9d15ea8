#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use crate::{
    error::Result,
    types::author::{Author, AuthorId, NewAuthor},
};

/// The operations every persistence backend offers over the `authors` table.
///
/// Missing ids are reported as [`crate::Error::NotFound`] by `get`, `update`
/// and `delete` alike.
pub trait AuthorRepository {
    /// Label used in log lines and reports.
    fn name(&self) -> &'static str;

    /// Creates the `authors` table if it does not exist yet.
    async fn create_table(&self) -> Result<()>;

    /// Removes every row.
    async fn reset(&self) -> Result<()>;

    async fn create(&self, author: &NewAuthor) -> Result<AuthorId>;

    async fn get(&self, id: AuthorId) -> Result<Author>;

    /// All authors, ordered by name.
    async fn list(&self) -> Result<Vec<Author>>;

    async fn delete(&self, id: AuthorId) -> Result<()>;

    /// Replaces every mutable field of the author.
    async fn update(&self, id: AuthorId, author: &NewAuthor) -> Result<()>;

    /// Authors born within `[start, end]`, oldest first.
    async fn list_by_birthdate_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Author>>;
}
