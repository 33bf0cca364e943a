//! In-process document store.
//!
//! Backs tests and local development. Documents live in an ordered map keyed
//! by path, so queries come back in document id order like the `PostgreSQL`
//! backend. Operation counters and one-shot commit failures let tests observe
//! what a handler did to the store.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use wardrobe_core::{CollectionPath, Document, DocumentPath, Fields, WriteBatch};

use super::{CommitResult, DocumentStore, StoreError, StoreResult};

/// Snapshot of operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// `get` and `query_eq` calls.
    pub reads: u64,
    /// Successful commits.
    pub commits: u64,
    /// Individual writes applied by successful commits.
    pub writes_applied: u64,
}

#[derive(Default)]
struct MemoryInner {
    documents: RwLock<BTreeMap<DocumentPath, Fields>>,
    reads: AtomicU64,
    commits: AtomicU64,
    writes_applied: AtomicU64,
    fail_next_commit: AtomicBool,
}

/// In-memory [`DocumentStore`]. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a document directly, bypassing batches and counters.
    ///
    /// Intended for fixtures.
    pub async fn insert(&self, path: DocumentPath, fields: Fields) {
        self.inner.documents.write().await.insert(path, fields);
    }

    /// Make the next commit fail with [`StoreError::Unavailable`] before any
    /// write is applied.
    pub fn fail_next_commit(&self) {
        self.inner.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Current operation counters.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            reads: self.inner.reads.load(Ordering::SeqCst),
            commits: self.inner.commits.load(Ordering::SeqCst),
            writes_applied: self.inner.writes_applied.load(Ordering::SeqCst),
        }
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.inner.documents.read().await.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.inner.documents.read().await.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        let documents = self.inner.documents.read().await;
        Ok(documents
            .get(path)
            .map(|fields| Document::new(path.id(), fields.clone())))
    }

    #[instrument(skip(self, value), fields(collection = %collection))]
    async fn query_eq(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        let documents = self.inner.documents.read().await;
        let matches: Vec<Document> = documents
            .iter()
            .filter(|(path, fields)| path.parent() == *collection && fields.get(field) == Some(value))
            .map(|(path, fields)| Document::new(path.id(), fields.clone()))
            .collect();
        debug!(count = matches.len(), "Query complete");
        Ok(matches)
    }

    #[instrument(skip(self, batch), fields(writes = batch.len()))]
    async fn commit(&self, batch: WriteBatch) -> StoreResult<CommitResult> {
        let mut documents = self.inner.documents.write().await;

        if self.inner.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected commit failure".to_owned()));
        }

        let commit_time = Utc::now();
        let write_count = batch.len();

        // Stage every write first; nothing touches `documents` until all succeed.
        let mut staged: BTreeMap<DocumentPath, Fields> = BTreeMap::new();
        for write in batch.writes() {
            let path = write.path();
            let current = staged.get(path).or_else(|| documents.get(path));
            let next = write
                .apply(current, commit_time)
                .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
            staged.insert(path.clone(), next);
        }
        documents.extend(staged);

        self.inner.commits.fetch_add(1, Ordering::SeqCst);
        self.inner
            .writes_applied
            .fetch_add(u64::try_from(write_count).unwrap_or(u64::MAX), Ordering::SeqCst);

        Ok(CommitResult {
            write_count,
            commit_time,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wardrobe_core::{FieldUpdates, FieldValue};

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => Fields::new(),
        }
    }

    fn doc(path: &str) -> DocumentPath {
        DocumentPath::parse(path).unwrap()
    }

    fn increment(field: &str) -> FieldUpdates {
        FieldUpdates::from([(field.to_string(), FieldValue::Increment(1))])
    }

    #[tokio::test]
    async fn test_query_filters_by_collection_and_value() {
        let store = MemoryStore::new();
        store
            .insert(doc("users/u1/outfits/b"), fields(json!({"occasion": "work"})))
            .await;
        store
            .insert(doc("users/u1/outfits/a"), fields(json!({"occasion": "work"})))
            .await;
        store
            .insert(doc("users/u1/outfits/c"), fields(json!({"occasion": "party"})))
            .await;
        store
            .insert(doc("users/u2/outfits/d"), fields(json!({"occasion": "work"})))
            .await;
        store
            .insert(
                doc("users/u1/outfits/a/notes/n"),
                fields(json!({"occasion": "work"})),
            )
            .await;

        let collection = CollectionPath::parse("users/u1/outfits").unwrap();
        let found = store
            .query_eq(&collection, "occasion", &json!("work"))
            .await
            .unwrap();

        let ids: Vec<&str> = found.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.stats().reads, 1);
    }

    #[tokio::test]
    async fn test_commit_applies_duplicate_updates_in_order() {
        let store = MemoryStore::new();
        store
            .insert(doc("users/u1/items/a"), fields(json!({"wornCount": 1})))
            .await;

        let mut batch = WriteBatch::new();
        batch
            .update(doc("users/u1/items/a"), increment("wornCount"))
            .update(doc("users/u1/items/a"), increment("wornCount"));
        let result = store.commit(batch).await.unwrap();

        assert_eq!(result.write_count, 2);
        let item = store.get(&doc("users/u1/items/a")).await.unwrap().unwrap();
        assert_eq!(item.fields.get("wornCount"), Some(&json!(3)));
        assert_eq!(
            store.stats(),
            StoreStats {
                reads: 1,
                commits: 1,
                writes_applied: 2
            }
        );
    }

    #[tokio::test]
    async fn test_update_of_missing_document_aborts_whole_batch() {
        let store = MemoryStore::new();
        store
            .insert(doc("users/u1/items/a"), fields(json!({"wornCount": 0})))
            .await;

        let mut batch = WriteBatch::new();
        batch
            .update(doc("users/u1/items/a"), increment("wornCount"))
            .update(doc("users/u1/items/ghost"), increment("wornCount"));
        let err = store.commit(batch).await.unwrap_err();

        assert!(matches!(err, StoreError::NotFound(ref p) if p == "users/u1/items/ghost"));
        let item = store.get(&doc("users/u1/items/a")).await.unwrap().unwrap();
        assert_eq!(item.fields.get("wornCount"), Some(&json!(0)));
        assert_eq!(store.stats().commits, 0);
    }

    #[tokio::test]
    async fn test_injected_failure_applies_nothing_and_is_one_shot() {
        let store = MemoryStore::new();
        store
            .insert(doc("users/u1/items/a"), fields(json!({"wornCount": 0})))
            .await;
        store.fail_next_commit();

        let mut batch = WriteBatch::new();
        batch.update(doc("users/u1/items/a"), increment("wornCount"));
        assert!(matches!(
            store.commit(batch.clone()).await,
            Err(StoreError::Unavailable(_))
        ));
        let item = store.get(&doc("users/u1/items/a")).await.unwrap().unwrap();
        assert_eq!(item.fields.get("wornCount"), Some(&json!(0)));

        store.commit(batch).await.unwrap();
        let item = store.get(&doc("users/u1/items/a")).await.unwrap().unwrap();
        assert_eq!(item.fields.get("wornCount"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_set_creates_documents() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);

        let mut batch = WriteBatch::new();
        batch.set(
            doc("users/u1/outfits/o1"),
            FieldUpdates::from([("title".to_string(), json!("Suit").into())]),
        );
        store.commit(batch).await.unwrap();

        assert_eq!(store.len().await, 1);
        let outfit = store.get(&doc("users/u1/outfits/o1")).await.unwrap().unwrap();
        assert_eq!(outfit.id, "o1");
        assert_eq!(outfit.fields.get("title"), Some(&json!("Suit")));
    }
}
