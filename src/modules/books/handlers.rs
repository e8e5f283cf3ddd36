//! HTTP handlers for the four book CRUD operations.

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;

use folio_authz::{AuthorizationPort, Caller};
use folio_http::error::AppError;
use folio_media::MediaImport;
use folio_store::{RecordId, RecordPatch};

use super::models::{
    BookDetail, BookSummary, CreateBookRequest, DeleteResponse, ListMeta, ListQuery,
    ListResponse, UpdateBookRequest,
};
use super::repository::{BookRepository, NewBook, BOOK_KIND};
use super::sanitize;

/// Shared dependencies of the books module handlers.
pub struct BooksState {
    pub repo: BookRepository,
    pub importer: Arc<dyn MediaImport>,
    pub authz: Arc<dyn AuthorizationPort>,
}

const MAX_PER_PAGE: u32 = 100;

/// GET / — public listing with pagination.
pub async fn list_books(
    State(state): State<Arc<BooksState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let per_page = query.per_page.clamp(1, MAX_PER_PAGE);
    let page = query.page.max(1);

    let result = state.repo.list(per_page, page).await?;

    if result.records.is_empty() {
        // Requesting a page past the end is an error; an empty first page is
        // a valid empty collection.
        if page > 1 {
            return Err(AppError::bad_request(
                "book_page_not_found",
                "Page number exceeds available pages.",
            ));
        }

        return Ok(Json(ListResponse {
            data: vec![],
            meta: ListMeta {
                total: 0,
                pages: 0,
                per_page,
                current: page,
            },
        }));
    }

    let data = result.records.iter().map(BookSummary::from).collect();

    Ok(Json(ListResponse {
        data,
        meta: ListMeta {
            total: result.total,
            pages: result.total_pages,
            per_page,
            current: page,
        },
    }))
}

/// POST / — create a book. A failed thumbnail import is logged and ignored;
/// the book is still created without a thumbnail.
pub async fn create_book(
    State(state): State<Arc<BooksState>>,
    headers: HeaderMap,
    Json(body): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookDetail>), AppError> {
    let caller = Caller::from_headers(&headers);
    if !state.authz.can_edit_records(&caller) {
        return Err(AppError::forbidden(
            "You are not allowed to create books.",
        ));
    }

    let title = sanitize::text_field(body.title.as_deref().unwrap_or(""));
    if title.is_empty() {
        return Err(AppError::validation(
            "book_title_required",
            vec![json!({"field": "title", "error": "required"})],
            "Book title is required.",
        ));
    }

    let status = match sanitize::key(body.status.as_deref().unwrap_or("")) {
        s if s.is_empty() => "publish".to_string(),
        s => s,
    };
    let thumbnail_url = body.thumbnail_url.as_deref().and_then(sanitize::url);

    let id = state
        .repo
        .create(NewBook {
            title,
            content: sanitize::rich_text(body.content.as_deref().unwrap_or("")),
            excerpt: sanitize::rich_text(body.excerpt.as_deref().unwrap_or("")),
            status,
        })
        .await?;

    if let Some(url) = thumbnail_url {
        match state.importer.import_from_url(&url, id).await {
            Ok(media_id) => state.repo.set_thumbnail(id, Some(media_id)).await?,
            Err(err) => {
                tracing::warn!(
                    book_id = id,
                    error = %err,
                    "thumbnail import failed, book created without thumbnail"
                );
            }
        }
    }

    let record = state
        .repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow!("created book {id} is missing")))?;

    Ok((StatusCode::CREATED, Json(BookDetail::from(&record))))
}

/// PUT/PATCH /{id} — partial update. A failed thumbnail import fails the
/// whole operation and none of the field changes are persisted; the detach
/// of the previous thumbnail has already taken effect by then.
pub async fn update_book(
    State(state): State<Arc<BooksState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateBookRequest>,
) -> Result<Json<BookDetail>, AppError> {
    let id = parse_book_id(&id)?;

    let record = match state.repo.find_by_id(id).await? {
        Some(record) if record.kind == BOOK_KIND => record,
        _ => return Err(invalid_id()),
    };

    let caller = Caller::from_headers(&headers);
    if !state.authz.can_edit_record(&caller, id) {
        return Err(AppError::forbidden(
            "You are not allowed to edit this book.",
        ));
    }

    let mut imported_thumbnail = None;
    if let Some(url) = body.thumbnail_url.as_deref().and_then(sanitize::url) {
        if record.thumbnail.is_some() {
            state.repo.set_thumbnail(id, None).await?;
        }

        match state.importer.import_from_url(&url, id).await {
            Ok(media_id) => imported_thumbnail = Some(media_id),
            Err(err) => {
                tracing::warn!(book_id = id, error = %err, "thumbnail import failed");
                return Err(AppError::bad_request(
                    "book_thumbnail_error",
                    "Failed to upload thumbnail image.",
                ));
            }
        }
    }

    let patch = RecordPatch {
        title: body.title.as_deref().map(sanitize::text_field),
        content: body.content.as_deref().map(sanitize::rich_text),
        excerpt: body.excerpt.as_deref().map(sanitize::rich_text),
        status: body.status.as_deref().map(sanitize::key),
    };
    state.repo.update(id, patch).await?;

    if let Some(media_id) = imported_thumbnail {
        state.repo.set_thumbnail(id, Some(media_id)).await?;
    }

    let record = state
        .repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow!("updated book {id} is missing")))?;

    Ok(Json(BookDetail::from(&record)))
}

/// DELETE /{id} — permanent delete.
pub async fn delete_book(
    State(state): State<Arc<BooksState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_book_id(&id)?;

    let record = state
        .repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("book_not_found", "Book not found."))?;
    if record.kind != BOOK_KIND {
        return Err(invalid_id());
    }

    let caller = Caller::from_headers(&headers);
    if !state.authz.can_delete_records(&caller) {
        return Err(AppError::forbidden(
            "You do not have permission to delete this book.",
        ));
    }

    if !state.repo.delete(id).await? {
        return Err(AppError::upstream(
            500,
            "book_delete_failed",
            "Failed to delete book.",
        ));
    }

    Ok(Json(DeleteResponse {
        deleted: true,
        id,
        message: "Book deleted successfully.".to_string(),
    }))
}

/// The id path parameter must be numeric and positive; anything else is
/// rejected before any store access.
fn parse_book_id(raw: &str) -> Result<RecordId, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .map(|id| id as RecordId)
        .ok_or_else(invalid_id)
}

fn invalid_id() -> AppError {
    AppError::bad_request("book_invalid_id", "Invalid book ID.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_id_must_be_a_positive_integer() {
        assert!(parse_book_id("1").is_ok());
        assert_eq!(parse_book_id(" 42 ").unwrap(), 42);
        assert!(parse_book_id("0").is_err());
        assert!(parse_book_id("-5").is_err());
        assert!(parse_book_id("abc").is_err());
        assert!(parse_book_id("1.5").is_err());
        assert!(parse_book_id("").is_err());
    }
}
