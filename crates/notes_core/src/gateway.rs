//! crates/notes_core/src/gateway.rs
//!
//! The operation set exposed to callers: create, fetch, list, partial-update,
//! delete, plus the sweep used by the background reaper. The gateway is where
//! the lifecycle rules from `domain::classify` are enforced on the read path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{classify, DisplayOption, ExpirationOffset, Note, NoteState};
use crate::ports::{NotePatch, NoteStore, PortError};

/// Default bound on note content length, in characters.
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 1000;

/// Errors surfaced to gateway callers. All are typed refusals, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Invalid note: {0}")]
    Validation(String),
    #[error("Note not found")]
    NotFound,
    /// The note exists but its visibility window has not opened yet.
    /// Carries `display_at` so clients can tell the user when to come back.
    #[error("Note is not yet available")]
    NotYetVisible { display_at: DateTime<Utc> },
    #[error("Note has expired")]
    Expired,
    #[error("Note was already read and deleted")]
    AlreadyConsumed,
    /// The store could not be reached; the caller should retry.
    #[error("Store unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Store error: {0}")]
    Storage(String),
}

impl From<PortError> for GatewayError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(_) => GatewayError::NotFound,
            PortError::Unavailable(msg) => GatewayError::StorageUnavailable(msg),
            PortError::Unexpected(msg) => GatewayError::Storage(msg),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// A validated request to create a note.
#[derive(Debug, Clone)]
pub struct CreateNote {
    pub content: String,
    pub display: DisplayOption,
    pub expiration: ExpirationOffset,
    pub auto_delete_after_reading: bool,
}

/// Front door for every note operation. Wraps the store and applies the
/// lifecycle rules; each operation is atomic with respect to a single note id.
///
/// All time-dependent operations take `now` from the caller so behavior is
/// deterministic under test; production callers pass `Utc::now()`.
#[derive(Clone)]
pub struct NoteGateway {
    store: Arc<dyn NoteStore>,
    max_content_chars: usize,
}

impl NoteGateway {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self::with_max_content_chars(store, DEFAULT_MAX_CONTENT_CHARS)
    }

    pub fn with_max_content_chars(store: Arc<dyn NoteStore>, max_content_chars: usize) -> Self {
        Self {
            store,
            max_content_chars,
        }
    }

    /// Validates and persists a new note, returning its fresh id.
    pub async fn create(&self, request: CreateNote, now: DateTime<Utc>) -> GatewayResult<Uuid> {
        self.validate_content(&request.content)?;

        let display_at = match request.display {
            DisplayOption::Now => now,
            DisplayOption::Later(at) if at < now => {
                return Err(GatewayError::Validation(
                    "display time must not be in the past".to_string(),
                ));
            }
            DisplayOption::Later(at) => at,
        };

        let expires_at = display_at + request.expiration.duration();
        if expires_at <= display_at {
            return Err(GatewayError::Validation(
                "expiry must be after the display time".to_string(),
            ));
        }

        let note = Note {
            id: Uuid::new_v4(),
            content: request.content,
            display_at,
            expires_at,
            is_read: false,
            auto_delete_after_reading: request.auto_delete_after_reading,
        };
        let id = note.id;
        self.store.insert(note).await?;
        debug!(%id, "note created");
        Ok(id)
    }

    /// The read path. Returns the note only while it is visible; otherwise a
    /// typed refusal. Expired and consumed records are deleted lazily here so
    /// correctness never depends on the reaper having run.
    pub async fn fetch(&self, id: Uuid, now: DateTime<Utc>) -> GatewayResult<Note> {
        let mut note = self.store.get(id).await?;

        match classify(&note, now) {
            NoteState::Pending => Err(GatewayError::NotYetVisible {
                display_at: note.display_at,
            }),
            NoteState::Expired => {
                // Lazy cleanup; a concurrent sweep may have won the race.
                self.store.delete(id).await?;
                Err(GatewayError::Expired)
            }
            NoteState::Consumed => {
                self.store.delete(id).await?;
                Err(GatewayError::AlreadyConsumed)
            }
            NoteState::Visible => {
                if !note.is_read {
                    self.store.mark_read(id).await?;
                    note.is_read = true;
                }
                Ok(note)
            }
        }
    }

    /// Every stored note, unfiltered. Clients apply their own visibility rules;
    /// this is an explicit contract, not an oversight.
    pub async fn list(&self) -> GatewayResult<Vec<Note>> {
        Ok(self.store.list().await?)
    }

    /// Merges caller-provided fields into the record. Content, if supplied, is
    /// held to the same bounds as create; no other lifecycle re-validation.
    pub async fn update(&self, id: Uuid, patch: NotePatch) -> GatewayResult<()> {
        if patch.is_empty() {
            return Err(GatewayError::Validation(
                "update must change at least one field".to_string(),
            ));
        }
        if let Some(content) = &patch.content {
            self.validate_content(content)?;
        }
        self.store.apply_patch(id, patch).await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> GatewayResult<()> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(GatewayError::NotFound)
        }
    }

    /// Deletes every note in a terminal state, returning how many went away.
    /// An id that disappears mid-sweep (lazy cleanup, concurrent delete) is
    /// counted as already gone rather than treated as an error.
    pub async fn sweep(&self, now: DateTime<Utc>) -> GatewayResult<usize> {
        let mut pruned = 0;
        for note in self.store.list().await? {
            if classify(&note, now).is_terminal() && self.store.delete(note.id).await? {
                debug!(id = %note.id, "reaped terminal note");
                pruned += 1;
            }
        }
        Ok(pruned)
    }

    fn validate_content(&self, content: &str) -> GatewayResult<()> {
        if content.trim().is_empty() {
            return Err(GatewayError::Validation("content must not be empty".to_string()));
        }
        let chars = content.chars().count();
        if chars > self.max_content_chars {
            return Err(GatewayError::Validation(format!(
                "content is {} characters, the maximum is {}",
                chars, self.max_content_chars
            )));
        }
        Ok(())
    }
}
