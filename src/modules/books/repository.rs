//! Book persistence against the host content store.

use std::sync::Arc;

use folio_http::error::AppError;
use folio_store::{
    ContentStore, MediaId, NewRecord, QueryPage, Record, RecordId, RecordPatch, RecordQuery,
    StatusFilter, StoreError,
};

/// Store-level kind identifier for books.
pub const BOOK_KIND: &str = "book";

/// Sanitized fields for inserting a new book.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub status: String,
}

/// CRUD operations over book records, delegating to the content store.
pub struct BookRepository {
    store: Arc<dyn ContentStore>,
}

impl BookRepository {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Publicly visible books, newest first, paginated.
    pub async fn list(&self, per_page: u32, page: u32) -> Result<QueryPage, AppError> {
        self.store
            .query(RecordQuery {
                kind: BOOK_KIND.to_string(),
                status: StatusFilter::PubliclyVisible,
                page,
                per_page,
            })
            .await
            .map_err(map_store_error)
    }

    pub async fn create(&self, book: NewBook) -> Result<RecordId, AppError> {
        self.store
            .insert(NewRecord {
                kind: BOOK_KIND.to_string(),
                title: book.title,
                content: book.content,
                excerpt: book.excerpt,
                status: book.status,
            })
            .await
            .map_err(map_store_error)
    }

    pub async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, AppError> {
        self.store.find(id).await.map_err(map_store_error)
    }

    pub async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<RecordId, AppError> {
        self.store.update(id, patch).await.map_err(map_store_error)
    }

    /// Permanent delete; `false` means the store reported failure.
    pub async fn delete(&self, id: RecordId) -> Result<bool, AppError> {
        self.store.delete(id).await.map_err(map_store_error)
    }

    pub async fn set_thumbnail(
        &self,
        id: RecordId,
        media: Option<MediaId>,
    ) -> Result<(), AppError> {
        self.store
            .set_thumbnail(id, media)
            .await
            .map_err(map_store_error)
    }
}

/// Map store failures onto the HTTP error taxonomy. Store validation errors
/// propagate as 400; an unregistered record type is a host misconfiguration.
fn map_store_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound => AppError::not_found("book_not_found", "Book not found."),
        StoreError::Validation(message) => AppError::upstream(400, "store_validation", message),
        StoreError::UnknownRecordType(kind) => AppError::upstream(
            500,
            "store_misconfigured",
            format!("record type '{kind}' is not registered"),
        ),
    }
}
