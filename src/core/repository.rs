pub mod ddb_repository;
pub mod memory_repository;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::domain::Entity;
use crate::core::library::LibraryResult;

#[async_trait]
pub trait EntityStore<T: Entity>: Sync + Send {
    // get an entity by its identifier
    async fn get_by_id(&self, id: T::Id) -> LibraryResult<Option<T>>;

    // find the first entity (in id order) whose field equals value
    async fn get_by_unique_field(&self, field: &str, value: &str) -> LibraryResult<Option<T>>;

    // zero-based page in id order along with the size of the collection
    async fn get_page(&self, page_number: usize, page_size: usize) -> LibraryResult<(Vec<T>, usize)>;

    // all entities in id order
    async fn get_all(&self) -> LibraryResult<Vec<T>>;

    // inserts or updates an entity and returns it with id and audit info assigned
    async fn upsert(&self, entity: &T) -> LibraryResult<T>;

    async fn exists_by_id(&self, id: T::Id) -> LibraryResult<bool>;

    // delete an entity
    async fn delete_by_id(&self, id: T::Id) -> LibraryResult<()>;
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum RepositoryStore {
    Memory,
    DynamoDB,
    LocalDynamoDB,
}
