use std::sync::Arc;
use crate::authors::domain::AuthorService;
use crate::authors::domain::model::AuthorEntity;
use crate::authors::domain::service::{AuthorEntityService, AuthorServiceImpl};
use crate::authors::factory::create_author_repository;
use crate::books::domain::BookService;
use crate::books::domain::model::BookEntity;
use crate::books::domain::service::{BookEntityService, BookServiceImpl};
use crate::books::factory::create_book_repository;
use crate::books::repository::BookRepository;
use crate::core::cache::{CacheLayer, create_cache};
use crate::core::cache::local_cache::LocalCache;
use crate::core::controller::AppState;
use crate::core::domain::{AuthorDeletePolicy, Configuration};
use crate::core::library::LibraryResult;
use crate::core::repository::EntityStore;
use crate::core::repository::memory_repository::MemoryRepository;
use crate::core::service::EntityService;

#[derive(Clone)]
pub struct LibraryServices {
    pub books: Arc<dyn BookService>,
    pub authors: Arc<dyn AuthorService>,
}

// wires both services over the given stores, sharing one cache
pub fn create_services(book_repo: Arc<dyn BookRepository>,
                       author_repo: Arc<dyn EntityStore<AuthorEntity>>,
                       cache: Arc<dyn CacheLayer>,
                       delete_policy: AuthorDeletePolicy) -> LibraryServices {
    let book_entities: BookEntityService = EntityService::new(book_repo, cache.clone());
    let author_entities: AuthorEntityService = EntityService::new(author_repo, cache);
    let authors: Arc<dyn AuthorService> = Arc::new(
        AuthorServiceImpl::new(author_entities, book_entities.clone(), delete_policy));
    let books: Arc<dyn BookService> = Arc::new(BookServiceImpl::new(book_entities, authors.clone()));
    LibraryServices { books, authors }
}

pub fn create_memory_services(delete_policy: AuthorDeletePolicy) -> LibraryServices {
    create_services(Arc::new(MemoryRepository::<BookEntity>::new()),
                    Arc::new(MemoryRepository::<AuthorEntity>::new()),
                    Arc::new(LocalCache::new()),
                    delete_policy)
}

pub async fn create_app_state(config: Configuration) -> LibraryResult<AppState> {
    let cache = create_cache(config.cache, &config.redis_url).await?;
    let book_repo = create_book_repository(&config).await;
    let author_repo = create_author_repository(&config).await;
    let services = create_services(book_repo, author_repo, cache, config.author_delete);
    Ok(AppState::new(config, services.books, services.authors))
}
