use std::sync::Arc;
use crate::authors::domain::model::AuthorEntity;
use crate::core::domain::Configuration;
use crate::core::repository::ddb_repository::DDBRepository;
use crate::core::repository::memory_repository::MemoryRepository;
use crate::core::repository::{EntityStore, RepositoryStore};
use crate::utils::ddb::{build_db_client, create_entity_tables};

pub const AUTHORS_TABLE: &str = "authors";

pub async fn create_author_repository(config: &Configuration) -> Arc<dyn EntityStore<AuthorEntity>> {
    match config.store {
        RepositoryStore::Memory => {
            Arc::new(MemoryRepository::<AuthorEntity>::new())
        }
        RepositoryStore::DynamoDB => {
            let client = build_db_client(config.store, &config.dynamodb_endpoint).await;
            Arc::new(DDBRepository::<AuthorEntity>::new(client, AUTHORS_TABLE))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(config.store, &config.dynamodb_endpoint).await;
            create_entity_tables(&client, AUTHORS_TABLE).await;
            Arc::new(DDBRepository::<AuthorEntity>::new(client, AUTHORS_TABLE))
        }
    }
}
