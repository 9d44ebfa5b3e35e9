//! crates/coach_core/src/mutability.rs
//!
//! The edit window for activity records. A record may be edited or deleted
//! only before `created_at + 24h`; every surface that offers either action
//! goes through these functions.

use chrono::{DateTime, Duration, Utc};

use crate::domain::ActivityRecord;

/// Length of the edit window, in hours.
pub const EDIT_WINDOW_HOURS: i64 = 24;

/// Shown in place of the edit and delete actions once the window has closed.
pub const EDIT_WINDOW_EXPIRED_MESSAGE: &str =
    "Activities can only be edited within 24 hours of creation for data integrity.";

/// The edit window as a `chrono::Duration`.
pub fn edit_window() -> Duration {
    Duration::hours(EDIT_WINDOW_HOURS)
}

/// The first instant at which the record is no longer editable.
pub fn editable_until(record: &ActivityRecord) -> DateTime<Utc> {
    record.created_at + edit_window()
}

/// Whether the record may still be edited or deleted at `now`.
pub fn can_edit(record: &ActivityRecord, now: DateTime<Utc>) -> bool {
    now < editable_until(record)
}

/// Returned by [`ensure_editable`] once the window has closed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", EDIT_WINDOW_EXPIRED_MESSAGE)]
pub struct EditWindowExpired {
    pub record_id: i64,
    pub expired_at: DateTime<Utc>,
}

/// Gate for mutating calls: edit and delete share it.
pub fn ensure_editable(record: &ActivityRecord, now: DateTime<Utc>) -> Result<(), EditWindowExpired> {
    if can_edit(record, now) {
        Ok(())
    } else {
        Err(EditWindowExpired {
            record_id: record.id,
            expired_at: editable_until(record),
        })
    }
}

/// What a record view should offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAvailability {
    /// Edit and delete actions are shown until the given instant.
    Editable { until: DateTime<Utc> },
    /// Actions are replaced by the fixed explanation.
    Expired { explanation: &'static str },
}

impl EditAvailability {
    pub fn for_record(record: &ActivityRecord, now: DateTime<Utc>) -> Self {
        if can_edit(record, now) {
            Self::Editable {
                until: editable_until(record),
            }
        } else {
            Self::Expired {
                explanation: EDIT_WINDOW_EXPIRED_MESSAGE,
            }
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Editable { .. })
    }
}
