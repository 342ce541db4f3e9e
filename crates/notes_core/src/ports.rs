//! crates/notes_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Note;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The store could not be reached. Callers should retry rather than
    /// treat the note as gone.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Note Store Port
//=========================================================================================

/// A partial update to a stored note. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub content: Option<String>,
    pub display_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_read: Option<bool>,
    pub auto_delete_after_reading: Option<bool>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.display_at.is_none()
            && self.expires_at.is_none()
            && self.is_read.is_none()
            && self.auto_delete_after_reading.is_none()
    }
}

/// The durable, authoritative home of note records. Implementations own the
/// only writable copy; everything else in the system is a projection.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Persists a freshly created note. The id is assumed unique.
    async fn insert(&self, note: Note) -> PortResult<()>;

    /// Loads a single note. `NotFound` if the id is unknown.
    async fn get(&self, id: Uuid) -> PortResult<Note>;

    /// Every stored note, in no particular order and with no lifecycle filtering.
    async fn list(&self) -> PortResult<Vec<Note>>;

    /// Merges the provided fields into the stored record.
    /// `NotFound` if the id is unknown.
    async fn apply_patch(&self, id: Uuid, patch: NotePatch) -> PortResult<()>;

    /// Sets `is_read = true` as a single atomic step against the store.
    /// Idempotent; `NotFound` if the id is unknown.
    async fn mark_read(&self, id: Uuid) -> PortResult<()>;

    /// Removes the record. Returns whether it existed, so callers can decide
    /// whether an absent id is an error (gateway delete) or a no-op (reaper).
    async fn delete(&self, id: Uuid) -> PortResult<bool>;
}
