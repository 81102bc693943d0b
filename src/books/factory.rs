use std::sync::Arc;
use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::books::repository::ddb_book_repository::BOOKS_TABLE;
use crate::core::domain::Configuration;
use crate::core::repository::ddb_repository::DDBRepository;
use crate::core::repository::memory_repository::MemoryRepository;
use crate::core::repository::RepositoryStore;
use crate::utils::ddb::{build_db_client, create_entity_tables};

pub async fn create_book_repository(config: &Configuration) -> Arc<dyn BookRepository> {
    match config.store {
        RepositoryStore::Memory => {
            Arc::new(MemoryRepository::<BookEntity>::new())
        }
        RepositoryStore::DynamoDB => {
            let client = build_db_client(config.store, &config.dynamodb_endpoint).await;
            Arc::new(DDBRepository::<BookEntity>::new(client, BOOKS_TABLE))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(config.store, &config.dynamodb_endpoint).await;
            create_entity_tables(&client, BOOKS_TABLE).await;
            Arc::new(DDBRepository::<BookEntity>::new(client, BOOKS_TABLE))
        }
    }
}
