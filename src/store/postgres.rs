use anyhow::{Context, Result};
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Row};

use crate::store::path::{CollectionPath, DocPath, Document};
use crate::store::traits::{AtomicStore, DocumentStore, QueryStore};

/// Document store backed by a single `documents` table keyed by
/// `(collection, id)` with a JSONB body.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the documents table and its indexes if missing
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (collection, id)
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create documents table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS documents_data_idx ON documents USING GIN (data)")
            .execute(&self.pool)
            .await
            .context("Failed to create documents data index")?;

        log::info!("Document table ready");
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<Document> {
    let id: String = row.try_get("id")?;
    let Json(data): Json<Value> = row.try_get("data")?;
    Ok(Document::new(id, data))
}

/// Escape LIKE wildcards so collection names match literally
fn like_suffix(name: &str) -> String {
    let escaped = name
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%/{}", escaped)
}

#[async_trait::async_trait]
impl DocumentStore for PostgresStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT data FROM documents WHERE collection = $1 AND id = $2")
            .bind(path.collection().as_str())
            .bind(path.id())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch document {}", path))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let Json(data): Json<Value> = row.try_get("data")?;
        Ok(Some(data))
    }

    async fn set(&self, path: &DocPath, data: Value) -> Result<()> {
        sqlx::query(
            "INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)
             ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()",
        )
        .bind(path.collection().as_str())
        .bind(path.id())
        .bind(Json(data))
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write document {}", path))?;

        Ok(())
    }

    async fn merge(&self, path: &DocPath, fields: Map<String, Value>) -> Result<bool> {
        // jsonb || jsonb replaces top-level keys, matching the in-memory merge
        let result = sqlx::query(
            "UPDATE documents SET data = data || $3, updated_at = now()
             WHERE collection = $1 AND id = $2",
        )
        .bind(path.collection().as_str())
        .bind(path.id())
        .bind(Json(Value::Object(fields)))
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to merge into document {}", path))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, path: &DocPath) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(path.collection().as_str())
            .bind(path.id())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete document {}", path))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>> {
        let rows = sqlx::query("SELECT id, data FROM documents WHERE collection = $1 ORDER BY id")
            .bind(collection.as_str())
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to list collection {}", collection))?;

        rows.iter().map(row_to_document).collect()
    }
}

#[async_trait::async_trait]
impl QueryStore for PostgresStore {
    async fn find_by_field(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            "SELECT id, data FROM documents WHERE collection = $1 AND data -> $2::text = $3::jsonb ORDER BY id",
        )
        .bind(collection.as_str())
        .bind(field)
        .bind(Json(value))
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to query {} by {}", collection, field))?;

        rows.iter().map(row_to_document).collect()
    }

    async fn find_containing(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            "SELECT id, data FROM documents
             WHERE collection = $1 AND jsonb_typeof(data -> $2::text) = 'array' AND data -> $2::text @> $3::jsonb
             ORDER BY id",
        )
        .bind(collection.as_str())
        .bind(field)
        .bind(Json(Value::Array(vec![value.clone()])))
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to query {} containing {}", collection, field))?;

        rows.iter().map(row_to_document).collect()
    }

    async fn collection_group(&self, name: &str) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            "SELECT id, data FROM documents WHERE collection = $1 OR collection LIKE $2
             ORDER BY collection, id",
        )
        .bind(name)
        .bind(like_suffix(name))
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to query collection group {}", name))?;

        rows.iter().map(row_to_document).collect()
    }
}

#[async_trait::async_trait]
impl AtomicStore for PostgresStore {
    async fn modify<T, F>(&self, path: &DocPath, f: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(Option<Value>) -> Result<(Option<Value>, T)> + Send,
    {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let row = sqlx::query("SELECT data FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE")
            .bind(path.collection().as_str())
            .bind(path.id())
            .fetch_optional(&mut *tx)
            .await
            .with_context(|| format!("Failed to lock document {}", path))?;

        let current = match row {
            Some(row) => {
                let Json(data): Json<Value> = row.try_get("data")?;
                Some(data)
            }
            None => None,
        };

        // Dropping `tx` on error rolls the transaction back
        let (next, result) = f(current)?;

        match next {
            Some(data) => {
                sqlx::query(
                    "INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)
                     ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()",
                )
                .bind(path.collection().as_str())
                .bind(path.id())
                .bind(Json(data))
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to write document {}", path))?;
            }
            None => {
                sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                    .bind(path.collection().as_str())
                    .bind(path.id())
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!("Failed to delete document {}", path))?;
            }
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(result)
    }
}
