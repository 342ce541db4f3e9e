//! services/api/tests/lifecycle.rs
//!
//! End-to-end lifecycle tests: the gateway driving the in-memory store
//! through creation, scheduled visibility, read-once consumption, expiry and
//! reaping. Every operation takes an explicit `now`, so the clock is advanced
//! by passing later instants rather than by sleeping.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use notes_core::domain::{DisplayOption, ExpirationOffset, Note};
use notes_core::gateway::{CreateNote, GatewayError, NoteGateway};
use notes_core::ports::{NotePatch, NoteStore, PortError, PortResult};
use uuid::Uuid;

use api_lib::adapters::memory::MemoryNoteStore;

fn gateway() -> NoteGateway {
    NoteGateway::new(Arc::new(MemoryNoteStore::new()))
}

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn request(content: &str) -> CreateNote {
    CreateNote {
        content: content.to_string(),
        display: DisplayOption::Now,
        expiration: ExpirationOffset::OneHour,
        auto_delete_after_reading: false,
    }
}

#[tokio::test]
async fn hello_note_is_visible_for_an_hour() {
    let gw = gateway();
    let now = t0();

    let id = gw.create(request("Hello"), now).await.unwrap();

    // Visible at T+30m with the original content.
    let note = gw.fetch(id, now + Duration::minutes(30)).await.unwrap();
    assert_eq!(note.content, "Hello");
    assert_eq!(note.display_at, now);
    assert_eq!(note.expires_at, now + Duration::hours(1));
    assert!(note.is_read);

    // At T+2h the window has closed.
    let err = gw.fetch(id, now + Duration::hours(2)).await.unwrap_err();
    assert!(matches!(err, GatewayError::Expired));

    // The expired fetch deleted the record; from now on the id is unknown.
    let err = gw.fetch(id, now + Duration::hours(2)).await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound));
}

#[tokio::test]
async fn scheduled_note_is_pending_until_its_display_instant() {
    let gw = gateway();
    let now = t0();
    let opens_at = now + Duration::days(1);

    let id = gw
        .create(
            CreateNote {
                display: DisplayOption::Later(opens_at),
                ..request("see you tomorrow")
            },
            now,
        )
        .await
        .unwrap();

    // Before the window opens the refusal carries the opening instant.
    match gw.fetch(id, now).await.unwrap_err() {
        GatewayError::NotYetVisible { display_at } => assert_eq!(display_at, opens_at),
        other => panic!("expected NotYetVisible, got {:?}", other),
    }

    // The expiry offset is applied to the scheduled instant, not to creation.
    let note = gw.fetch(id, opens_at).await.unwrap();
    assert_eq!(note.expires_at, opens_at + Duration::hours(1));
}

#[tokio::test]
async fn non_auto_delete_note_can_be_read_repeatedly() {
    let gw = gateway();
    let now = t0();

    let id = gw.create(request("sticky"), now).await.unwrap();

    let first = gw.fetch(id, now).await.unwrap();
    let second = gw.fetch(id, now + Duration::minutes(1)).await.unwrap();
    assert_eq!(first.content, second.content);

    // Still retrievable a third time.
    assert!(gw.fetch(id, now + Duration::minutes(2)).await.is_ok());
}

#[tokio::test]
async fn auto_delete_note_is_consumed_by_its_first_read() {
    let gw = gateway();
    let now = t0();

    let id = gw
        .create(
            CreateNote {
                auto_delete_after_reading: true,
                ..request("burn after reading")
            },
            now,
        )
        .await
        .unwrap();

    let note = gw.fetch(id, now).await.unwrap();
    assert_eq!(note.content, "burn after reading");

    // The second fetch refuses and deletes the record as a side effect.
    let err = gw.fetch(id, now + Duration::minutes(1)).await.unwrap_err();
    assert!(matches!(err, GatewayError::AlreadyConsumed));

    let err = gw.fetch(id, now + Duration::minutes(2)).await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound));
}

#[tokio::test]
async fn create_rejects_bad_input() {
    let gw = gateway();
    let now = t0();

    let err = gw.create(request(""), now).await.unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)));

    let err = gw.create(request("   "), now).await.unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)));

    let oversized = "x".repeat(1001);
    let err = gw.create(request(&oversized), now).await.unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)));

    // Exactly at the bound is fine.
    let at_bound = "x".repeat(1000);
    assert!(gw.create(request(&at_bound), now).await.is_ok());

    // A display instant in the past is rejected.
    let err = gw
        .create(
            CreateNote {
                display: DisplayOption::Later(now - Duration::minutes(1)),
                ..request("too late")
            },
            now,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)));
}

#[tokio::test]
async fn list_is_unfiltered_across_lifecycle_states() {
    let gw = gateway();
    let now = t0();

    let pending = gw
        .create(
            CreateNote {
                display: DisplayOption::Later(now + Duration::days(1)),
                ..request("pending")
            },
            now,
        )
        .await
        .unwrap();
    let visible = gw.create(request("visible"), now).await.unwrap();
    let expired = gw.create(request("expired"), now).await.unwrap();

    // Push the third note past its window; list at T+2h still shows all three.
    gw.update(
        expired,
        NotePatch {
            expires_at: Some(now + Duration::minutes(1)),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let ids: Vec<_> = gw.list().await.unwrap().into_iter().map(|n| n.id).collect();
    assert_eq!(ids.len(), 3);
    for id in [pending, visible, expired] {
        assert!(ids.contains(&id));
    }
}

#[tokio::test]
async fn sweep_removes_only_terminal_notes() {
    let gw = gateway();
    let now = t0();

    let keeper = gw.create(request("still good"), now).await.unwrap();
    let pending = gw
        .create(
            CreateNote {
                display: DisplayOption::Later(now + Duration::days(1)),
                ..request("not yet")
            },
            now,
        )
        .await
        .unwrap();
    let doomed = gw.create(request("short lived"), now).await.unwrap();
    let consumed = gw
        .create(
            CreateNote {
                auto_delete_after_reading: true,
                ..request("read me once")
            },
            now,
        )
        .await
        .unwrap();

    // Consume one note, expire another.
    gw.fetch(consumed, now).await.unwrap();
    gw.update(
        doomed,
        NotePatch {
            expires_at: Some(now + Duration::minutes(1)),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let pruned = gw.sweep(now + Duration::minutes(5)).await.unwrap();
    assert_eq!(pruned, 2);

    // Survivors are untouched, terminal notes are gone for good.
    assert!(gw.fetch(keeper, now + Duration::minutes(5)).await.is_ok());
    assert!(matches!(
        gw.fetch(pending, now + Duration::minutes(5)).await.unwrap_err(),
        GatewayError::NotYetVisible { .. }
    ));
    assert!(matches!(
        gw.fetch(doomed, now + Duration::minutes(5)).await.unwrap_err(),
        GatewayError::NotFound
    ));
    assert!(matches!(
        gw.fetch(consumed, now + Duration::minutes(5)).await.unwrap_err(),
        GatewayError::NotFound
    ));

    // Sweeping again finds nothing left to do.
    assert_eq!(gw.sweep(now + Duration::minutes(10)).await.unwrap(), 0);
}

#[tokio::test]
async fn update_merges_fields_and_enforces_content_bounds() {
    let gw = gateway();
    let now = t0();

    let id = gw.create(request("draft"), now).await.unwrap();

    gw.update(
        id,
        NotePatch {
            content: Some("final".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(gw.fetch(id, now).await.unwrap().content, "final");

    // Content in a patch is held to the same bound as create.
    let err = gw
        .update(
            id,
            NotePatch {
                content: Some("x".repeat(1001)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)));

    // An empty patch is refused, an unknown id reports NotFound.
    let err = gw.update(id, NotePatch::default()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)));
    let err = gw
        .update(
            uuid::Uuid::new_v4(),
            NotePatch {
                is_read: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound));
}

#[tokio::test]
async fn delete_is_not_found_once_the_note_is_gone() {
    let gw = gateway();
    let now = t0();

    let id = gw.create(request("short stay"), now).await.unwrap();
    gw.delete(id).await.unwrap();

    assert!(matches!(gw.delete(id).await.unwrap_err(), GatewayError::NotFound));
    assert!(matches!(
        gw.fetch(id, now).await.unwrap_err(),
        GatewayError::NotFound
    ));
}

#[tokio::test]
async fn expiration_offsets_compound_from_the_display_instant() {
    let gw = gateway();
    let now = t0();

    for (offset, duration) in [
        (ExpirationOffset::OneHour, Duration::hours(1)),
        (ExpirationOffset::OneDay, Duration::days(1)),
        (ExpirationOffset::OneWeek, Duration::weeks(1)),
    ] {
        let id = gw
            .create(
                CreateNote {
                    expiration: offset,
                    ..request("windowed")
                },
                now,
            )
            .await
            .unwrap();
        let note = gw.fetch(id, now).await.unwrap();
        assert_eq!(note.expires_at, now + duration);
    }
}

/// A store whose backing service is down: every operation fails with the
/// retryable `Unavailable` error.
struct UnreachableStore;

fn store_down() -> PortError {
    PortError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl NoteStore for UnreachableStore {
    async fn insert(&self, _note: Note) -> PortResult<()> {
        Err(store_down())
    }

    async fn get(&self, _id: Uuid) -> PortResult<Note> {
        Err(store_down())
    }

    async fn list(&self) -> PortResult<Vec<Note>> {
        Err(store_down())
    }

    async fn apply_patch(&self, _id: Uuid, _patch: NotePatch) -> PortResult<()> {
        Err(store_down())
    }

    async fn mark_read(&self, _id: Uuid) -> PortResult<()> {
        Err(store_down())
    }

    async fn delete(&self, _id: Uuid) -> PortResult<bool> {
        Err(store_down())
    }
}

#[tokio::test]
async fn unreachable_store_surfaces_as_storage_unavailable() {
    let gw = NoteGateway::new(Arc::new(UnreachableStore));
    let now = t0();

    // Every operation reports the retryable condition instead of NotFound
    // or a generic failure, so callers know the note may still exist.
    assert!(matches!(
        gw.create(request("lost"), now).await.unwrap_err(),
        GatewayError::StorageUnavailable(_)
    ));
    assert!(matches!(
        gw.fetch(Uuid::new_v4(), now).await.unwrap_err(),
        GatewayError::StorageUnavailable(_)
    ));
    assert!(matches!(
        gw.list().await.unwrap_err(),
        GatewayError::StorageUnavailable(_)
    ));
    assert!(matches!(
        gw.update(
            Uuid::new_v4(),
            NotePatch {
                is_read: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err(),
        GatewayError::StorageUnavailable(_)
    ));
    assert!(matches!(
        gw.delete(Uuid::new_v4()).await.unwrap_err(),
        GatewayError::StorageUnavailable(_)
    ));
    assert!(matches!(
        gw.sweep(now).await.unwrap_err(),
        GatewayError::StorageUnavailable(_)
    ));
}
