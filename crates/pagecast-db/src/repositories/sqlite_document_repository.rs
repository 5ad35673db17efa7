//! `SQLite` implementation of the `DocumentRepository` trait.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use pagecast_core::{Document, DocumentRepository, RepositoryError};

/// `SQLite` implementation of the `DocumentRepository` trait.
///
/// Each document is stored whole as a JSON blob keyed by its id. Segments
/// are never queried individually, so there is no per-segment table.
pub struct SqliteDocumentRepository {
    pool: SqlitePool,
}

impl SqliteDocumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Ensure the documents table exists.
    pub async fn ensure_table(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                saved_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }
}

fn storage(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn decode(row: &SqliteRow) -> Result<Document, RepositoryError> {
    let body: String = row.get("body");
    serde_json::from_str(&body).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn encode(document: &Document) -> Result<String, RepositoryError> {
    serde_json::to_string(document).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

#[async_trait]
impl DocumentRepository for SqliteDocumentRepository {
    async fn save(&self, document: &Document) -> Result<(), RepositoryError> {
        let body = encode(document)?;

        // REPLACE deletes and re-inserts, so a re-saved document gets a new
        // rowid and moves to the front of the library.
        sqlx::query("INSERT OR REPLACE INTO documents (id, title, body, saved_at) VALUES (?, ?, ?, ?)")
            .bind(&document.id)
            .bind(&document.title)
            .bind(&body)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        tracing::debug!(document_id = %document.id, "Document saved");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Document>, RepositoryError> {
        let rows = sqlx::query("SELECT body FROM documents ORDER BY rowid DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        rows.iter().map(decode).collect()
    }

    async fn get(&self, id: &str) -> Result<Document, RepositoryError> {
        let row = sqlx::query("SELECT body FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::NotFound(format!("document {id}")))?;

        decode(&row)
    }

    async fn update_progress(&self, id: &str, segment_id: usize) -> Result<(), RepositoryError> {
        let segment_id = i64::try_from(segment_id)
            .map_err(|_| RepositoryError::Storage(format!("segment id {segment_id} out of range")))?;
        let read_at = Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true);

        // One statement, so concurrent writers cannot interleave a read and a write.
        let result = sqlx::query(
            r"
            UPDATE documents
            SET body = json_set(body, '$.lastPlayedSegmentId', ?, '$.lastReadDate', ?)
            WHERE id = ?
            ",
        )
        .bind(segment_id)
        .bind(read_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        if result.rows_affected() == 0 {
            tracing::debug!(document_id = %id, "Progress update for unknown document ignored");
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<Vec<Document>, RepositoryError> {
        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        self.list().await
    }
}
