//! In-memory implementation of the content and media stores.
//!
//! Concurrency model: one `tokio::sync::RwLock` over the whole host state.
//! Inserts and deletes are atomic; concurrent updates to the same record are
//! last-write-wins. Nothing survives a restart.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use folio_kernel::RecordTypeDef;

use crate::{
    ContentStore, MediaId, MediaStore, NewRecord, QueryPage, Record, RecordId, RecordPatch,
    RecordQuery, StatusFilter, StoreError, ThumbnailRef,
};

/// Status values considered publicly visible by queries.
const PUBLIC_STATUSES: &[&str] = &["publish"];

struct StoredRecord {
    kind: String,
    title: String,
    content: String,
    excerpt: String,
    status: String,
    slug: String,
    thumbnail: Option<MediaId>,
    created_at: OffsetDateTime,
    modified_at: OffsetDateTime,
}

struct StoredAsset {
    owner: RecordId,
    filename: String,
}

#[derive(Default)]
struct HostState {
    types: HashMap<String, RecordTypeDef>,
    records: BTreeMap<RecordId, StoredRecord>,
    assets: BTreeMap<MediaId, StoredAsset>,
    next_record_id: RecordId,
    next_media_id: MediaId,
}

/// In-memory host store implementing both [`ContentStore`] and [`MediaStore`].
pub struct MemoryHost {
    base_url: String,
    inner: RwLock<HostState>,
}

impl MemoryHost {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            inner: RwLock::new(HostState::default()),
        }
    }

    fn permalink(&self, state: &HostState, record: &StoredRecord) -> String {
        let segment = state
            .types
            .get(&record.kind)
            .map(|def| def.rewrite_slug)
            .unwrap_or("content");
        format!("{}/{}/{}", self.base_url, segment, record.slug)
    }

    fn asset_url(&self, id: MediaId, asset: &StoredAsset) -> String {
        format!("{}/media/{}/{}", self.base_url, id, asset.filename)
    }

    fn view(&self, state: &HostState, id: RecordId, record: &StoredRecord) -> Record {
        let thumbnail = record.thumbnail.and_then(|media_id| {
            state.assets.get(&media_id).map(|asset| ThumbnailRef {
                media_id,
                url: self.asset_url(media_id, asset),
            })
        });

        Record {
            id,
            kind: record.kind.clone(),
            title: record.title.clone(),
            content: record.content.clone(),
            excerpt: record.excerpt.clone(),
            status: record.status.clone(),
            slug: record.slug.clone(),
            thumbnail,
            created_at: record.created_at,
            modified_at: record.modified_at,
            permalink: self.permalink(state, record),
        }
    }
}

/// Derive a URL slug from a title: lowercase alphanumerics joined by hyphens.
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }

    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "record".to_string()
    } else {
        slug
    }
}

#[async_trait]
impl ContentStore for MemoryHost {
    async fn register_type(&self, def: RecordTypeDef) {
        let mut state = self.inner.write().await;
        tracing::info!(kind = def.kind, label = def.label, "registering record type");
        state.types.insert(def.kind.to_string(), def);
    }

    async fn insert(&self, record: NewRecord) -> Result<RecordId, StoreError> {
        let mut state = self.inner.write().await;

        if !state.types.contains_key(&record.kind) {
            return Err(StoreError::UnknownRecordType(record.kind));
        }
        if record.title.is_empty() {
            return Err(StoreError::Validation("title must not be empty".into()));
        }

        state.next_record_id += 1;
        let id = state.next_record_id;

        let mut slug = slugify(&record.title);
        if state.records.values().any(|r| r.slug == slug) {
            slug = format!("{slug}-{id}");
        }

        let now = OffsetDateTime::now_utc();
        state.records.insert(
            id,
            StoredRecord {
                kind: record.kind,
                title: record.title,
                content: record.content,
                excerpt: record.excerpt,
                status: record.status,
                slug,
                thumbnail: None,
                created_at: now,
                modified_at: now,
            },
        );

        Ok(id)
    }

    async fn find(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
        let state = self.inner.read().await;
        Ok(state
            .records
            .get(&id)
            .map(|record| self.view(&state, id, record)))
    }

    async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<RecordId, StoreError> {
        let mut state = self.inner.write().await;

        let record = state.records.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(title) = patch.title {
            if title.is_empty() {
                return Err(StoreError::Validation("title must not be empty".into()));
            }
            record.title = title;
        }
        if let Some(content) = patch.content {
            record.content = content;
        }
        if let Some(excerpt) = patch.excerpt {
            record.excerpt = excerpt;
        }
        if let Some(status) = patch.status {
            record.status = status;
        }
        record.modified_at = OffsetDateTime::now_utc();

        Ok(id)
    }

    async fn delete(&self, id: RecordId) -> Result<bool, StoreError> {
        let mut state = self.inner.write().await;
        let removed = state.records.remove(&id).is_some();
        if removed {
            // Drop media owned by the deleted record as well.
            state.assets.retain(|_, asset| asset.owner != id);
        }
        Ok(removed)
    }

    async fn query(&self, query: RecordQuery) -> Result<QueryPage, StoreError> {
        let state = self.inner.read().await;

        if !state.types.contains_key(&query.kind) {
            return Err(StoreError::UnknownRecordType(query.kind));
        }

        let mut matches: Vec<(&RecordId, &StoredRecord)> = state
            .records
            .iter()
            .filter(|(_, record)| record.kind == query.kind)
            .filter(|(_, record)| match query.status {
                StatusFilter::PubliclyVisible => {
                    PUBLIC_STATUSES.contains(&record.status.as_str())
                }
                StatusFilter::Any => true,
            })
            .collect();

        // Host default ordering: newest first.
        matches.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at).then(b.0.cmp(a.0)));

        let total = matches.len() as u64;
        let per_page = query.per_page.max(1);
        let total_pages = total.div_ceil(per_page as u64) as u32;
        let skip = (query.page.max(1) - 1) as usize * per_page as usize;

        let records = matches
            .into_iter()
            .skip(skip)
            .take(per_page as usize)
            .map(|(id, record)| self.view(&state, *id, record))
            .collect();

        Ok(QueryPage {
            records,
            total,
            total_pages,
        })
    }

    async fn set_thumbnail(
        &self,
        id: RecordId,
        media: Option<MediaId>,
    ) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;

        if let Some(media_id) = media {
            if !state.assets.contains_key(&media_id) {
                return Err(StoreError::Validation(format!(
                    "unknown media asset {media_id}"
                )));
            }
        }

        let record = state.records.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.thumbnail = media;
        record.modified_at = OffsetDateTime::now_utc();
        Ok(())
    }
}

#[async_trait]
impl MediaStore for MemoryHost {
    async fn sideload(
        &self,
        owner: RecordId,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<MediaId, StoreError> {
        let mut state = self.inner.write().await;

        if !state.records.contains_key(&owner) {
            return Err(StoreError::Validation(format!(
                "owner record {owner} does not exist"
            )));
        }
        if bytes.is_empty() {
            return Err(StoreError::Validation("asset payload is empty".into()));
        }

        state.next_media_id += 1;
        let id = state.next_media_id;

        tracing::debug!(
            media_id = id,
            owner,
            content_type,
            size = bytes.len(),
            "sideloaded media asset"
        );

        state.assets.insert(
            id,
            StoredAsset {
                owner,
                filename: filename.to_string(),
            },
        );

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_type() -> RecordTypeDef {
        RecordTypeDef {
            kind: "book",
            rewrite_slug: "book",
            label: "Book",
        }
    }

    fn host() -> MemoryHost {
        MemoryHost::new("http://localhost:8080/")
    }

    fn new_book(title: &str, status: &str) -> NewRecord {
        NewRecord {
            kind: "book".into(),
            title: title.into(),
            content: String::new(),
            excerpt: String::new(),
            status: status.into(),
        }
    }

    #[tokio::test]
    async fn insert_and_find_round_trip() {
        let host = host();
        host.register_type(book_type()).await;

        let id = host.insert(new_book("The Fall", "publish")).await.unwrap();
        let record = host.find(id).await.unwrap().unwrap();

        assert_eq!(record.title, "The Fall");
        assert_eq!(record.status, "publish");
        assert_eq!(record.slug, "the-fall");
        assert_eq!(record.permalink, "http://localhost:8080/book/the-fall");
        assert!(record.thumbnail.is_none());
    }

    #[tokio::test]
    async fn insert_rejects_unknown_kind() {
        let host = host();
        let err = host.insert(new_book("X", "publish")).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownRecordType(_)));
    }

    #[tokio::test]
    async fn duplicate_titles_get_distinct_slugs() {
        let host = host();
        host.register_type(book_type()).await;

        let a = host.insert(new_book("Dune", "publish")).await.unwrap();
        let b = host.insert(new_book("Dune", "publish")).await.unwrap();

        let slug_a = host.find(a).await.unwrap().unwrap().slug;
        let slug_b = host.find(b).await.unwrap().unwrap().slug;
        assert_ne!(slug_a, slug_b);
    }

    #[tokio::test]
    async fn query_filters_drafts_from_public_listing() {
        let host = host();
        host.register_type(book_type()).await;

        host.insert(new_book("Visible", "publish")).await.unwrap();
        host.insert(new_book("Hidden", "draft")).await.unwrap();

        let page = host
            .query(RecordQuery {
                kind: "book".into(),
                status: StatusFilter::PubliclyVisible,
                page: 1,
                per_page: 10,
            })
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.records[0].title, "Visible");
    }

    #[tokio::test]
    async fn query_paginates_and_counts_pages() {
        let host = host();
        host.register_type(book_type()).await;

        for i in 0..5 {
            host.insert(new_book(&format!("Book {i}"), "publish"))
                .await
                .unwrap();
        }

        let page = host
            .query(RecordQuery {
                kind: "book".into(),
                status: StatusFilter::PubliclyVisible,
                page: 3,
                per_page: 2,
            })
            .await
            .unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.records.len(), 1);
    }

    #[tokio::test]
    async fn partial_update_leaves_other_fields() {
        let host = host();
        host.register_type(book_type()).await;

        let id = host
            .insert(NewRecord {
                kind: "book".into(),
                title: "Old".into(),
                content: "body".into(),
                excerpt: "short".into(),
                status: "publish".into(),
            })
            .await
            .unwrap();

        host.update(
            id,
            RecordPatch {
                title: Some("New".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let record = host.find(id).await.unwrap().unwrap();
        assert_eq!(record.title, "New");
        assert_eq!(record.content, "body");
        assert_eq!(record.excerpt, "short");
        assert_eq!(record.status, "publish");
    }

    #[tokio::test]
    async fn thumbnail_attach_and_detach() {
        let host = host();
        host.register_type(book_type()).await;

        let id = host.insert(new_book("Covered", "publish")).await.unwrap();
        let media = host
            .sideload(id, "cover.jpg", "image/jpeg", vec![1, 2, 3])
            .await
            .unwrap();

        host.set_thumbnail(id, Some(media)).await.unwrap();
        let record = host.find(id).await.unwrap().unwrap();
        let thumb = record.thumbnail.unwrap();
        assert_eq!(thumb.media_id, media);
        assert!(thumb.url.ends_with("/cover.jpg"));

        host.set_thumbnail(id, None).await.unwrap();
        let record = host.find(id).await.unwrap().unwrap();
        assert!(record.thumbnail.is_none());
    }

    #[tokio::test]
    async fn delete_is_permanent_and_reports_missing() {
        let host = host();
        host.register_type(book_type()).await;

        let id = host.insert(new_book("Gone", "publish")).await.unwrap();
        assert!(host.delete(id).await.unwrap());
        assert!(host.find(id).await.unwrap().is_none());
        assert!(!host.delete(id).await.unwrap());
    }

    #[test]
    fn slugify_handles_symbols_and_empty_input() {
        assert_eq!(slugify("Hello,  World!"), "hello-world");
        assert_eq!(slugify("---"), "record");
        assert_eq!(slugify("Ünicode title"), "nicode-title");
    }
}
