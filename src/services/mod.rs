//! Business logic services

pub mod books;
pub mod storage;

use crate::{config::UploadsConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BookService,
    pub storage: storage::StorageService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, uploads: &UploadsConfig) -> Self {
        let storage = storage::StorageService::new(uploads);

        Self {
            books: books::BookService::new(repository, storage.clone()),
            storage,
        }
    }
}
