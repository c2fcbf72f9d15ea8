use chrono::{DateTime, Utc};

use super::queries::Queries;
use crate::{
    db::{self, Pool},
    error::{Error, Result},
    traits::AuthorRepository,
    types::author::{Author, AuthorId, NewAuthor},
};

/// Backend over hand-written, parameterized statements executed with sqlx.
#[derive(Debug, Clone)]
pub struct SqlxAuthorRepository {
    queries: Queries,
}

impl SqlxAuthorRepository {
    pub const NAME: &'static str = "SQLX";

    pub fn new(pool: Pool) -> Self {
        Self {
            queries: Queries::new(pool),
        }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(db::connect_pool(url).await?))
    }

    pub async fn close(&self) {
        self.queries.pool().close().await
    }
}

impl AuthorRepository for SqlxAuthorRepository {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn create_table(&self) -> Result<()> {
        Ok(self.queries.create_table().await?)
    }

    async fn reset(&self) -> Result<()> {
        self.queries.delete_all_authors().await?;
        Ok(())
    }

    async fn create(&self, author: &NewAuthor) -> Result<AuthorId> {
        Ok(self.queries.create_author(author).await?)
    }

    async fn get(&self, id: AuthorId) -> Result<Author> {
        self.queries
            .get_author(id)
            .await?
            .ok_or(Error::NotFound { id })
    }

    async fn list(&self) -> Result<Vec<Author>> {
        Ok(self.queries.list_authors().await?)
    }

    async fn delete(&self, id: AuthorId) -> Result<()> {
        match self.queries.delete_author(id).await? {
            0 => Err(Error::NotFound { id }),
            _ => Ok(()),
        }
    }

    async fn update(&self, id: AuthorId, author: &NewAuthor) -> Result<()> {
        match self.queries.update_author(id, author).await? {
            0 => Err(Error::NotFound { id }),
            _ => Ok(()),
        }
    }

    async fn list_by_birthdate_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Author>> {
        Ok(self
            .queries
            .get_authors_by_birthdate_range(start, end)
            .await?)
    }
}
