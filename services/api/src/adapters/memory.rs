//! services/api/src/adapters/memory.rs
//!
//! An in-memory implementation of the `NoteStore` port, backed by a
//! `RwLock<HashMap>`. It stands in for Postgres when no `DATABASE_URL` is
//! configured and backs the test suite. Unlike the database adapter it is
//! process-local: every note is gone on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use notes_core::domain::Note;
use notes_core::ports::{NotePatch, NoteStore, PortError, PortResult};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A volatile note store. Cheap to construct, safe to share via `Arc`.
#[derive(Default)]
pub struct MemoryNoteStore {
    notes: RwLock<HashMap<Uuid, Note>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn insert(&self, note: Note) -> PortResult<()> {
        self.notes.write().await.insert(note.id, note);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> PortResult<Note> {
        self.notes
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Note {} not found", id)))
    }

    async fn list(&self) -> PortResult<Vec<Note>> {
        Ok(self.notes.read().await.values().cloned().collect())
    }

    async fn apply_patch(&self, id: Uuid, patch: NotePatch) -> PortResult<()> {
        let mut notes = self.notes.write().await;
        let note = notes
            .get_mut(&id)
            .ok_or_else(|| PortError::NotFound(format!("Note {} not found", id)))?;

        if let Some(content) = patch.content {
            note.content = content;
        }
        if let Some(display_at) = patch.display_at {
            note.display_at = display_at;
        }
        if let Some(expires_at) = patch.expires_at {
            note.expires_at = expires_at;
        }
        if let Some(is_read) = patch.is_read {
            note.is_read = is_read;
        }
        if let Some(auto_delete) = patch.auto_delete_after_reading {
            note.auto_delete_after_reading = auto_delete;
        }
        Ok(())
    }

    async fn mark_read(&self, id: Uuid) -> PortResult<()> {
        // The write lock makes the check-then-set a single atomic step.
        let mut notes = self.notes.write().await;
        let note = notes
            .get_mut(&id)
            .ok_or_else(|| PortError::NotFound(format!("Note {} not found", id)))?;
        note.is_read = true;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> PortResult<bool> {
        Ok(self.notes.write().await.remove(&id).is_some())
    }
}
