use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use folio_store::Record;

/// Query parameters for listing books.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Number of books to return per page.
    #[serde(default = "ListQuery::default_per_page")]
    pub per_page: u32,
    /// 1-indexed page number.
    #[serde(default = "ListQuery::default_page")]
    pub page: u32,
}

impl ListQuery {
    fn default_per_page() -> u32 {
        10
    }

    fn default_page() -> u32 {
        1
    }
}

/// Request body for creating a book. All fields are raw and pass through
/// sanitization before use; `title` is required but validated after
/// sanitization so whitespace-only titles are rejected too.
#[derive(Debug, Deserialize, Default)]
pub struct CreateBookRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub status: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Request body for a partial update. Absent fields are left untouched.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub status: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Per-book row in list responses.
#[derive(Debug, Serialize)]
pub struct BookSummary {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub date: String,
    pub modified: String,
    pub thumbnail_url: Option<String>,
    pub permalink: String,
}

impl From<&Record> for BookSummary {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            content: record.content.clone(),
            excerpt: record.excerpt.clone(),
            date: rfc3339(record.created_at),
            modified: rfc3339(record.modified_at),
            thumbnail_url: record.thumbnail.as_ref().map(|t| t.url.clone()),
            permalink: record.permalink.clone(),
        }
    }
}

/// Full book projection returned by create and update.
#[derive(Debug, Serialize)]
pub struct BookDetail {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub status: String,
    pub permalink: String,
    pub thumbnail_url: Option<String>,
}

impl From<&Record> for BookDetail {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            content: record.content.clone(),
            excerpt: record.excerpt.clone(),
            status: record.status.clone(),
            permalink: record.permalink.clone(),
            thumbnail_url: record.thumbnail.as_ref().map(|t| t.url.clone()),
        }
    }
}

/// Pagination metadata for list responses.
#[derive(Debug, Serialize)]
pub struct ListMeta {
    pub total: u64,
    pub pages: u32,
    pub per_page: u32,
    pub current: u32,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: Vec<BookSummary>,
    pub meta: ListMeta,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: u64,
    pub message: String,
}

fn rfc3339(timestamp: OffsetDateTime) -> String {
    timestamp.format(&Rfc3339).unwrap_or_default()
}
