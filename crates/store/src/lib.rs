//! Content and media store collaborators.
//!
//! The REST layer talks to the host platform through the [`ContentStore`] and
//! [`MediaStore`] traits. [`MemoryHost`] implements both in memory and is the
//! store used by the application and its tests.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use folio_kernel::RecordTypeDef;

pub mod memory;

pub use memory::MemoryHost;

/// Store-assigned record identifier. Never reused, never mutated.
pub type RecordId = u64;

/// Store-assigned media asset identifier.
pub type MediaId = u64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("unknown record type '{0}'")]
    UnknownRecordType(String),

    #[error("{0}")]
    Validation(String),
}

/// Thumbnail reference resolved to a servable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRef {
    pub media_id: MediaId,
    pub url: String,
}

/// A stored content record as returned by queries and lookups.
///
/// `permalink` and `thumbnail.url` are derived by the store on read.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: RecordId,
    pub kind: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub status: String,
    pub slug: String,
    pub thumbnail: Option<ThumbnailRef>,
    pub created_at: OffsetDateTime,
    pub modified_at: OffsetDateTime,
    pub permalink: String,
}

/// Fields for inserting a new record.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub kind: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub status: String,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub status: Option<String>,
}

/// Status class filter for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Records visible to unauthenticated readers.
    PubliclyVisible,
    Any,
}

#[derive(Debug, Clone)]
pub struct RecordQuery {
    pub kind: String,
    pub status: StatusFilter,
    /// 1-indexed page number.
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone)]
pub struct QueryPage {
    pub records: Vec<Record>,
    pub total: u64,
    pub total_pages: u32,
}

/// CRUD plus filtered paginated query over typed records.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Register a content type declaration. Inserts and queries against
    /// unregistered kinds fail with [`StoreError::UnknownRecordType`].
    async fn register_type(&self, def: RecordTypeDef);

    async fn insert(&self, record: NewRecord) -> Result<RecordId, StoreError>;

    async fn find(&self, id: RecordId) -> Result<Option<Record>, StoreError>;

    async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<RecordId, StoreError>;

    /// Permanent delete. Returns `false` when the record no longer exists.
    async fn delete(&self, id: RecordId) -> Result<bool, StoreError>;

    async fn query(&self, query: RecordQuery) -> Result<QueryPage, StoreError>;

    /// Attach or detach the thumbnail asset of a record.
    async fn set_thumbnail(
        &self,
        id: RecordId,
        media: Option<MediaId>,
    ) -> Result<(), StoreError>;
}

/// Media asset storage scoped to an owning record.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn sideload(
        &self,
        owner: RecordId,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<MediaId, StoreError>;
}
