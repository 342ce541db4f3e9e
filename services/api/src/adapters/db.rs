//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `NoteStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notes_core::domain::Note;
use notes_core::ports::{NotePatch, NoteStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `NoteStore` port.
#[derive(Clone)]
pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    /// Creates a new `PgNoteStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps a low-level sqlx error onto the port taxonomy. Connection-level
/// failures become `Unavailable` so callers know a retry may succeed.
fn map_sqlx_error(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound("note not found".to_string()),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            PortError::Unavailable(e.to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct NoteRecord {
    id: Uuid,
    content: String,
    display_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    is_read: bool,
    auto_delete_after_reading: bool,
}

impl NoteRecord {
    fn to_domain(self) -> Note {
        Note {
            id: self.id,
            content: self.content,
            display_at: self.display_at,
            expires_at: self.expires_at,
            is_read: self.is_read,
            auto_delete_after_reading: self.auto_delete_after_reading,
        }
    }
}

//=========================================================================================
// `NoteStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn insert(&self, note: Note) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO notes (id, content, display_at, expires_at, is_read, auto_delete_after_reading) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(note.id)
        .bind(&note.content)
        .bind(note.display_at)
        .bind(note.expires_at)
        .bind(note.is_read)
        .bind(note.auto_delete_after_reading)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> PortResult<Note> {
        let record = sqlx::query_as::<_, NoteRecord>(
            "SELECT id, content, display_at, expires_at, is_read, auto_delete_after_reading \
             FROM notes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| PortError::NotFound(format!("Note {} not found", id)))?;
        Ok(record.to_domain())
    }

    async fn list(&self) -> PortResult<Vec<Note>> {
        let records = sqlx::query_as::<_, NoteRecord>(
            "SELECT id, content, display_at, expires_at, is_read, auto_delete_after_reading \
             FROM notes ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn apply_patch(&self, id: Uuid, patch: NotePatch) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE notes SET \
                 content = COALESCE($2, content), \
                 display_at = COALESCE($3, display_at), \
                 expires_at = COALESCE($4, expires_at), \
                 is_read = COALESCE($5, is_read), \
                 auto_delete_after_reading = COALESCE($6, auto_delete_after_reading) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(patch.content)
        .bind(patch.display_at)
        .bind(patch.expires_at)
        .bind(patch.is_read)
        .bind(patch.auto_delete_after_reading)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Note {} not found", id)));
        }
        Ok(())
    }

    async fn mark_read(&self, id: Uuid) -> PortResult<()> {
        // Single UPDATE, so the check-then-set is atomic on the database side.
        let result = sqlx::query("UPDATE notes SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Note {} not found", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
