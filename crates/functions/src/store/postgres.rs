//! `PostgreSQL` document store.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE documents (
//!     collection TEXT NOT NULL,   -- e.g. users/u1/items
//!     doc_id TEXT NOT NULL,       -- e.g. shirt
//!     data JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL,
//!     PRIMARY KEY (collection, doc_id)
//! );
//! ```
//!
//! Migrations are stored in `crates/functions/migrations/` and run via:
//! ```bash
//! cargo run -p wardrobe-cli -- migrate
//! ```
//!
//! A commit is one transaction. `now()` is fixed for the whole transaction,
//! which gives every server timestamp in a batch the same value. Update targets
//! are locked with `SELECT ... FOR UPDATE` in path order before any write, so
//! increments racing from concurrent commits serialize on the row instead of
//! losing counts, and batches naming the same rows in different orders cannot
//! deadlock. Writes are applied in batch order to the locked snapshot and each
//! touched document is stored once.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{Postgres, Row, Transaction};
use tracing::{debug, instrument};

use wardrobe_core::{CollectionPath, Document, DocumentPath, Fields, Write, WriteBatch};

use super::{CommitResult, DocumentStore, StoreError, StoreResult};

/// `PostgreSQL` backend.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect with a pool sized for a function host.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the connection cannot be established.
    pub async fn connect(database_url: &SecretString) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url.expose_secret())
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Migration` if a migration fails.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn row_to_document(row: &PgRow) -> StoreResult<Document> {
    let id: String = row.try_get("doc_id")?;
    let Json(data): Json<Value> = row.try_get("data")?;
    match data {
        Value::Object(fields) => Ok(Document::new(id, fields)),
        other => Err(StoreError::DataCorruption(format!(
            "document {id} is not an object: {other}"
        ))),
    }
}

async fn locked_fields(
    tx: &mut Transaction<'_, Postgres>,
    path: &DocumentPath,
) -> StoreResult<Option<Fields>> {
    let row = sqlx::query(
        r"
        SELECT doc_id, data
        FROM documents
        WHERE collection = $1 AND doc_id = $2
        FOR UPDATE
        ",
    )
    .bind(path.parent().to_string())
    .bind(path.id())
    .fetch_optional(&mut **tx)
    .await?;

    row.as_ref()
        .map(row_to_document)
        .transpose()
        .map(|doc| doc.map(|d| d.fields))
}

async fn store_fields(
    tx: &mut Transaction<'_, Postgres>,
    path: &DocumentPath,
    fields: Fields,
    now: DateTime<Utc>,
) -> StoreResult<()> {
    sqlx::query(
        r"
        INSERT INTO documents (collection, doc_id, data, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $4)
        ON CONFLICT (collection, doc_id) DO UPDATE SET
            data = EXCLUDED.data,
            updated_at = EXCLUDED.updated_at
        ",
    )
    .bind(path.parent().to_string())
    .bind(path.id())
    .bind(Json(Value::Object(fields)))
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Distinct update targets in lock order.
fn update_targets(writes: &[Write]) -> BTreeSet<&DocumentPath> {
    writes
        .iter()
        .filter(|write| matches!(write, Write::Update { .. }))
        .map(Write::path)
        .collect()
}

impl DocumentStore for PostgresStore {
    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        let row = sqlx::query(
            r"
            SELECT doc_id, data
            FROM documents
            WHERE collection = $1 AND doc_id = $2
            ",
        )
        .bind(path.parent().to_string())
        .bind(path.id())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_document).transpose()
    }

    #[instrument(skip(self, value), fields(collection = %collection))]
    async fn query_eq(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query(
            r"
            SELECT doc_id, data
            FROM documents
            WHERE collection = $1 AND data -> $2 = $3
            ORDER BY doc_id
            ",
        )
        .bind(collection.to_string())
        .bind(field)
        .bind(Json(value))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Query complete");
        rows.iter().map(row_to_document).collect()
    }

    #[instrument(skip(self, batch), fields(writes = batch.len()))]
    async fn commit(&self, batch: WriteBatch) -> StoreResult<CommitResult> {
        let write_count = batch.len();
        let writes = batch.into_writes();
        let mut tx = self.pool.begin().await?;

        let commit_time: DateTime<Utc> = sqlx::query_scalar("SELECT now()")
            .fetch_one(&mut *tx)
            .await?;

        let mut current: BTreeMap<DocumentPath, Fields> = BTreeMap::new();
        for path in update_targets(&writes) {
            if let Some(fields) = locked_fields(&mut tx, path).await? {
                current.insert(path.clone(), fields);
            }
        }

        // Dropping `tx` on an error path rolls the whole batch back.
        let mut staged: BTreeMap<DocumentPath, Fields> = BTreeMap::new();
        for write in &writes {
            let path = write.path();
            let base = staged.get(path).or_else(|| current.get(path));
            let next = write
                .apply(base, commit_time)
                .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
            staged.insert(path.clone(), next);
        }

        for (path, fields) in staged {
            store_fields(&mut tx, &path, fields, commit_time).await?;
        }

        tx.commit().await?;

        Ok(CommitResult {
            write_count,
            commit_time,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
