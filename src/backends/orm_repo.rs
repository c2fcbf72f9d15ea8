use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Schema,
};

use super::entity::{self, Column, Entity};
use crate::{
    db,
    error::{Error, Result},
    traits::AuthorRepository,
    types::author::{Author, AuthorId, NewAuthor},
};

/// Backend that lets sea-orm generate every statement from the entity in
/// [`super::entity`].
#[derive(Debug, Clone)]
pub struct OrmAuthorRepository {
    db: DatabaseConnection,
}

impl OrmAuthorRepository {
    pub const NAME: &'static str = "ORM";

    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(db::connect_orm(url).await?))
    }

    pub async fn close(self) -> Result<()> {
        Ok(self.db.close().await?)
    }
}

fn active_model(author: &NewAuthor) -> entity::ActiveModel {
    entity::ActiveModel {
        id:            NotSet,
        name:          Set(author.name.clone()),
        bio:           Set(author.bio.clone()),
        email:         Set(author.email.clone()),
        date_of_birth: Set(author.date_of_birth),
    }
}

impl AuthorRepository for OrmAuthorRepository {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn create_table(&self) -> Result<()> {
        let backend = self.db.get_database_backend();
        let mut table = Schema::new(backend).create_table_from_entity(Entity);
        table.if_not_exists();
        self.db.execute(backend.build(&table)).await?;
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        Entity::delete_many().exec(&self.db).await?;
        Ok(())
    }

    async fn create(&self, author: &NewAuthor) -> Result<AuthorId> {
        let res = Entity::insert(active_model(author)).exec(&self.db).await?;
        Ok(res.last_insert_id)
    }

    async fn get(&self, id: AuthorId) -> Result<Author> {
        Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Author::from)
            .ok_or(Error::NotFound { id })
    }

    async fn list(&self) -> Result<Vec<Author>> {
        Ok(Entity::find()
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Author::from)
            .collect())
    }

    async fn delete(&self, id: AuthorId) -> Result<()> {
        let res = Entity::delete_by_id(id).exec(&self.db).await?;
        match res.rows_affected {
            0 => Err(Error::NotFound { id }),
            _ => Ok(()),
        }
    }

    async fn update(&self, id: AuthorId, author: &NewAuthor) -> Result<()> {
        let res = Entity::update_many()
            .set(active_model(author))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        match res.rows_affected {
            0 => Err(Error::NotFound { id }),
            _ => Ok(()),
        }
    }

    async fn list_by_birthdate_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Author>> {
        Ok(Entity::find()
            .filter(Column::DateOfBirth.between(start, end))
            .order_by_asc(Column::DateOfBirth)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Author::from)
            .collect())
    }
}
