//! Book record management service

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookChanges, BookQuery, NewBook},
    repository::{books::ListCriteria, Repository},
    services::storage::{FileUpload, StorageService},
};

/// Decoded fields of a create/update form.
///
/// Text fields submitted empty are treated as absent, so `None` covers
/// both a missing and an empty field.
#[derive(Debug, Default)]
pub struct BookForm {
    pub name: Option<String>,
    pub author: Option<String>,
    pub price: Option<String>,
    pub tag: Option<String>,
    pub document: Option<FileUpload>,
}

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
    storage: StorageService,
}

impl BookService {
    pub fn new(repository: Repository, storage: StorageService) -> Self {
        Self {
            repository,
            storage,
        }
    }

    /// List book records, newest first, honoring the OR-combined filters.
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let criteria = ListCriteria::from_query(query)?;
        self.repository.books.find(&criteria).await
    }

    /// Get a single book record by id.
    pub async fn get(&self, id: i32) -> AppResult<Book> {
        self.repository
            .books
            .find_one(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book record not existing!".to_string()))
    }

    /// Create a book record, storing the attached document first if one
    /// was uploaded. Validation happens before any write.
    pub async fn create(&self, form: BookForm) -> AppResult<Book> {
        let BookForm {
            name,
            author,
            price,
            tag,
            document,
        } = form;

        let (Some(name), Some(author), Some(price_text)) = (name, author, price) else {
            return Err(AppError::Validation("Missing required fields!".to_string()));
        };

        let mut book = NewBook {
            name,
            author,
            price: parse_price(&price_text)?,
            tag,
            document: None,
        };

        if let Some(ref upload) = document {
            book.document = Some(self.storage.store(upload).await?);
        }

        self.repository.books.create(&book).await
    }

    /// Apply a partial update to a book record.
    ///
    /// A newly uploaded document is stored first; only then is the previous
    /// document (if any still exists on disk) removed, and the record
    /// updated. A failed removal leaves the record untouched.
    pub async fn update(&self, id: i32, form: BookForm) -> AppResult<Book> {
        let existing = self.get(id).await?;

        let mut changes = BookChanges {
            name: form.name,
            author: form.author,
            price: form.price.as_deref().map(parse_price).transpose()?,
            tag: form.tag,
            document: None,
        };

        if let Some(ref upload) = form.document {
            let descriptor = self.storage.store(upload).await?;

            if let Some(ref old) = existing.document {
                if let Some(path) = self.storage.resolve_url(&old.url) {
                    self.storage.delete_if_exists(&path).await?;
                }
            }

            changes.document = Some(descriptor);
        }

        self.repository.books.update(id, &changes).await
    }

    /// Remove a book record. Any attached document is left in storage.
    pub async fn destroy(&self, id: i32) -> AppResult<()> {
        self.get(id).await?;
        self.repository.books.destroy(id).await
    }
}

fn parse_price(text: &str) -> AppResult<Decimal> {
    text.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid price value: {}", text)))
}
