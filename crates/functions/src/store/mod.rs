//! Document store client.
//!
//! Handlers talk to the store only through [`DocumentStore`]: a point read,
//! an equality query over one collection, and an atomic batch commit. Two
//! backends implement it:
//!
//! - [`MemoryStore`] - in-process, used by tests and `WARDROBE_STORE=memory`
//! - [`PostgresStore`] - one JSONB row per document in `PostgreSQL`
//!
//! [`Store`] wraps whichever backend the configuration selects. The process
//! holds exactly one client, installed once with [`init_global`] at start-up
//! and handed to handlers through application state.
//!
//! # Commit semantics
//!
//! - All writes of a batch land or none do.
//! - An update of a missing document fails the whole batch with
//!   [`StoreError::NotFound`].
//! - Every server timestamp in one commit resolves to the same instant.

mod memory;
mod postgres;

use std::future::Future;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use wardrobe_core::{CollectionPath, Document, DocumentPath, WriteBatch};

pub use memory::{MemoryStore, StoreStats};
pub use postgres::PostgresStore;

/// Errors returned by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx that retrying will not fix.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// An update targeted a document that does not exist.
    #[error("no document to update: {0}")]
    NotFound(String),

    /// Stored data cannot be read back.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The store could not serve the request (transient).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The process-wide client was installed twice.
    #[error("document store already initialized")]
    AlreadyInitialized,
}

impl From<sqlx::Error> for StoreError {
    /// Connection loss, pool exhaustion, serialization failures and deadlocks
    /// become [`StoreError::Unavailable`]; everything else stays a database
    /// error.
    fn from(err: sqlx::Error) -> Self {
        let transient = match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => true,
            sqlx::Error::Database(db) => db.code().is_some_and(|code| is_transient_sqlstate(&code)),
            _ => false,
        };
        if transient {
            Self::Unavailable(err.to_string())
        } else {
            Self::Database(err)
        }
    }
}

/// SQLSTATEs worth redelivering: `40001` serialization failure, `40P01`
/// deadlock, and the `08` connection exception class.
fn is_transient_sqlstate(code: &str) -> bool {
    matches!(code, "40001" | "40P01") || code.starts_with("08")
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Outcome of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitResult {
    /// Number of writes applied.
    pub write_count: usize,
    /// Server time assigned to the commit.
    pub commit_time: DateTime<Utc>,
}

/// Read/write primitives used by the handlers.
pub trait DocumentStore: Send + Sync {
    /// Read one document.
    fn get(
        &self,
        path: &DocumentPath,
    ) -> impl Future<Output = StoreResult<Option<Document>>> + Send;

    /// Documents of `collection` whose `field` equals `value`, in document id
    /// order.
    fn query_eq(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> impl Future<Output = StoreResult<Vec<Document>>> + Send;

    /// Apply all writes of `batch` atomically.
    fn commit(&self, batch: WriteBatch) -> impl Future<Output = StoreResult<CommitResult>> + Send;

    /// Check the backend is reachable.
    fn ping(&self) -> impl Future<Output = StoreResult<()>> + Send;
}

/// The configured backend.
#[derive(Clone)]
pub enum Store {
    /// In-process store.
    Memory(MemoryStore),
    /// `PostgreSQL` store.
    Postgres(PostgresStore),
}

impl Store {
    /// Short backend name for logs.
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl DocumentStore for Store {
    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        match self {
            Self::Memory(store) => store.get(path).await,
            Self::Postgres(store) => store.get(path).await,
        }
    }

    async fn query_eq(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        match self {
            Self::Memory(store) => store.query_eq(collection, field, value).await,
            Self::Postgres(store) => store.query_eq(collection, field, value).await,
        }
    }

    async fn commit(&self, batch: WriteBatch) -> StoreResult<CommitResult> {
        match self {
            Self::Memory(store) => store.commit(batch).await,
            Self::Postgres(store) => store.commit(batch).await,
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        match self {
            Self::Memory(store) => store.ping().await,
            Self::Postgres(store) => store.ping().await,
        }
    }
}

static GLOBAL_STORE: OnceLock<Arc<Store>> = OnceLock::new();

/// Install the process-wide store client.
///
/// # Errors
///
/// Returns [`StoreError::AlreadyInitialized`] if a client is already installed.
pub fn init_global(store: Store) -> StoreResult<Arc<Store>> {
    let store = Arc::new(store);
    GLOBAL_STORE
        .set(Arc::clone(&store))
        .map_err(|_| StoreError::AlreadyInitialized)?;
    tracing::info!(backend = store.backend_name(), "Document store initialized");
    Ok(store)
}

/// The process-wide store client, if installed.
#[must_use]
pub fn global() -> Option<Arc<Store>> {
    GLOBAL_STORE.get().cloned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_global_store_initializes_once() {
        let first = init_global(Store::Memory(MemoryStore::new())).unwrap();
        assert!(Arc::ptr_eq(&first, &global().unwrap()));

        let second = init_global(Store::Memory(MemoryStore::new()));
        assert!(matches!(second, Err(StoreError::AlreadyInitialized)));
        assert!(Arc::ptr_eq(&first, &global().unwrap()));
    }

    #[test]
    fn test_transient_sqlx_errors_are_unavailable() {
        let transient = [
            sqlx::Error::PoolTimedOut,
            sqlx::Error::PoolClosed,
            sqlx::Error::Io(std::io::Error::from(std::io::ErrorKind::ConnectionReset)),
        ];
        for err in transient {
            assert!(matches!(StoreError::from(err), StoreError::Unavailable(_)));
        }

        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }

    #[test]
    fn test_transient_sqlstates() {
        for code in ["40001", "40P01", "08000", "08006", "08P01"] {
            assert!(is_transient_sqlstate(code), "{code}");
        }
        for code in ["23505", "42P01", "22P02", "40002"] {
            assert!(!is_transient_sqlstate(code), "{code}");
        }
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(Store::Memory(MemoryStore::new()).backend_name(), "memory");
    }
}
