//! crates/notes_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// A scheduled, expirable note. The only entity in the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub content: String,
    /// Instant the note becomes readable.
    pub display_at: DateTime<Utc>,
    /// Instant the note becomes unreadable. Always after `display_at`.
    pub expires_at: DateTime<Utc>,
    pub is_read: bool,
    pub auto_delete_after_reading: bool,
}

/// Where a note sits in its lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    /// Exists but `now < display_at`.
    Pending,
    /// Currently readable.
    Visible,
    /// `now >= expires_at`; permanently unreadable.
    Expired,
    /// Read once and marked for auto-deletion. Terminal regardless of time.
    Consumed,
}

impl NoteState {
    /// Whether the note can never become readable again and may be purged.
    pub fn is_terminal(self) -> bool {
        matches!(self, NoteState::Expired | NoteState::Consumed)
    }
}

/// Classifies a note at `now`. Total and side-effect free; this is the single
/// implementation of the lifecycle rule, shared by the read path and the reaper.
pub fn classify(note: &Note, now: DateTime<Utc>) -> NoteState {
    if note.is_read && note.auto_delete_after_reading {
        NoteState::Consumed
    } else if now >= note.expires_at {
        NoteState::Expired
    } else if now < note.display_at {
        NoteState::Pending
    } else {
        NoteState::Visible
    }
}

/// When a newly created note becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOption {
    /// Visible immediately.
    Now,
    /// Visible at a caller-chosen future instant.
    Later(DateTime<Utc>),
}

/// How long a note stays visible after `display_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationOffset {
    OneHour,
    OneDay,
    OneWeek,
}

impl ExpirationOffset {
    pub fn duration(self) -> Duration {
        match self {
            ExpirationOffset::OneHour => Duration::hours(1),
            ExpirationOffset::OneDay => Duration::days(1),
            ExpirationOffset::OneWeek => Duration::weeks(1),
        }
    }

    /// The wire representation used by clients ("1h", "1d", "1w").
    pub fn as_str(self) -> &'static str {
        match self {
            ExpirationOffset::OneHour => "1h",
            ExpirationOffset::OneDay => "1d",
            ExpirationOffset::OneWeek => "1w",
        }
    }
}

impl std::str::FromStr for ExpirationOffset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(ExpirationOffset::OneHour),
            "1d" => Ok(ExpirationOffset::OneDay),
            "1w" => Ok(ExpirationOffset::OneWeek),
            other => Err(format!("'{}' is not a valid expiration (expected 1h, 1d or 1w)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_at(display_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Note {
        Note {
            id: Uuid::new_v4(),
            content: "Hello".to_string(),
            display_at,
            expires_at,
            is_read: false,
            auto_delete_after_reading: false,
        }
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn visible_inside_window() {
        let now = t0();
        let note = note_at(now - Duration::minutes(5), now + Duration::minutes(5));
        assert_eq!(classify(&note, now), NoteState::Visible);
    }

    #[test]
    fn visible_exactly_at_display_instant() {
        let now = t0();
        let note = note_at(now, now + Duration::hours(1));
        assert_eq!(classify(&note, now), NoteState::Visible);
    }

    #[test]
    fn pending_before_display_instant() {
        let now = t0();
        let note = note_at(now + Duration::days(1), now + Duration::days(1) + Duration::hours(1));
        assert_eq!(classify(&note, now), NoteState::Pending);
    }

    #[test]
    fn expired_exactly_at_expiry_instant() {
        let now = t0();
        let note = note_at(now - Duration::hours(1), now);
        assert_eq!(classify(&note, now), NoteState::Expired);
    }

    #[test]
    fn consumed_wins_over_time_checks() {
        let now = t0();
        // Still inside its window, but read with auto-delete set.
        let mut note = note_at(now - Duration::minutes(1), now + Duration::hours(1));
        note.is_read = true;
        note.auto_delete_after_reading = true;
        assert_eq!(classify(&note, now), NoteState::Consumed);

        // Even an expired note reports Consumed once read with auto-delete.
        let mut stale = note_at(now - Duration::hours(2), now - Duration::hours(1));
        stale.is_read = true;
        stale.auto_delete_after_reading = true;
        assert_eq!(classify(&stale, now), NoteState::Consumed);
    }

    #[test]
    fn read_without_auto_delete_stays_visible() {
        let now = t0();
        let mut note = note_at(now - Duration::minutes(1), now + Duration::hours(1));
        note.is_read = true;
        assert_eq!(classify(&note, now), NoteState::Visible);
    }

    #[test]
    fn offset_wire_names_round_trip() {
        for offset in [
            ExpirationOffset::OneHour,
            ExpirationOffset::OneDay,
            ExpirationOffset::OneWeek,
        ] {
            assert_eq!(offset.as_str().parse::<ExpirationOffset>(), Ok(offset));
        }
        assert!("2h".parse::<ExpirationOffset>().is_err());
    }

    #[test]
    fn offset_durations() {
        assert_eq!(ExpirationOffset::OneHour.duration(), Duration::hours(1));
        assert_eq!(ExpirationOffset::OneDay.duration(), Duration::days(1));
        assert_eq!(ExpirationOffset::OneWeek.duration(), Duration::days(7));
    }
}
