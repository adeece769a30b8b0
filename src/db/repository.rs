//! Database repository for page documents and background backups.
//!
//! Pages are stored whole as serialized JSON documents; the builder edits a
//! page as one unit, so there is no per-field schema here. Backups are
//! opaque strings keyed by page id.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::BuilderError;
use crate::models::Page;

/// Repository over the builder's sqlite store.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== PAGE OPERATIONS ====================

    /// Insert or replace a page document.
    pub async fn save_page(&self, page: &Page) -> Result<(), BuilderError> {
        let document = serde_json::to_string(page)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO pages (id, document, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at",
        )
        .bind(&page.id)
        .bind(&document)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load a page by id.
    pub async fn get_page(&self, id: &str) -> Result<Option<Page>, BuilderError> {
        let row = sqlx::query("SELECT document FROM pages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let document: String = row.get("document");
                let page = serde_json::from_str(&document).map_err(|err| {
                    tracing::error!(page_id = %id, "stored page document is corrupt: {}", err);
                    BuilderError::Deserialization(format!("corrupt page document: {}", err))
                })?;
                Ok(Some(page))
            }
            None => Ok(None),
        }
    }

    /// Delete a page. Missing ids are not an error.
    pub async fn delete_page(&self, id: &str) -> Result<(), BuilderError> {
        sqlx::query("DELETE FROM pages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// List all stored page ids, most recently saved first.
    pub async fn list_page_ids(&self) -> Result<Vec<String>, BuilderError> {
        let rows = sqlx::query("SELECT id FROM pages ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }

    // ==================== BACKUP OPERATIONS ====================

    /// Store an opaque background backup blob for a page, replacing any
    /// previous one.
    pub async fn put_backup(&self, page_id: &str, payload: &str) -> Result<(), BuilderError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO background_backups (page_id, payload, created_at) VALUES (?, ?, ?)
             ON CONFLICT(page_id) DO UPDATE SET payload = excluded.payload, created_at = excluded.created_at",
        )
        .bind(page_id)
        .bind(payload)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch the backup blob for a page, if any.
    pub async fn get_backup(&self, page_id: &str) -> Result<Option<String>, BuilderError> {
        let row = sqlx::query("SELECT payload FROM background_backups WHERE page_id = ?")
            .bind(page_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("payload")))
    }

    /// Drop the backup for a page. Missing ids are not an error.
    pub async fn delete_backup(&self, page_id: &str) -> Result<(), BuilderError> {
        sqlx::query("DELETE FROM background_backups WHERE page_id = ?")
            .bind(page_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
