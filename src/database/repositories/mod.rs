// 存储库
// Persistence seams for items and users. Handlers only see the traits;
// Postgres implementations live next to them.

use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Item, ItemChanges, ItemListQuery, NewItem, UserEntity};

pub mod item;
pub mod user;

pub use item::PgItemRepository;
pub use user::PgUserRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A unique constraint rejected the write.
    #[error("{0} already exists")]
    Conflict(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn list(&self, query: &ItemListQuery) -> Result<Vec<Item>, RepositoryError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Item>, RepositoryError>;
    async fn create(&self, item: NewItem) -> Result<Item, RepositoryError>;
    /// `None` when no item has this id.
    async fn update(&self, id: &str, changes: ItemChanges) -> Result<Option<Item>, RepositoryError>;
    /// `false` when no item has this id.
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
    async fn ping(&self) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, RepositoryError>;
    async fn create(
        &self,
        email: &str,
        hashed_password: &str,
        role: &str,
    ) -> Result<UserEntity, RepositoryError>;
}
