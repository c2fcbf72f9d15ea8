pub mod entity;
pub mod orm_repo;
pub mod queries;
pub mod sqlx_repo;

pub use orm_repo::OrmAuthorRepository;
pub use sqlx_repo::SqlxAuthorRepository;
