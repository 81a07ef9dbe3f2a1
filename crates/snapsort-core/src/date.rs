//! Timestamp reconciliation.

use chrono::NaiveDateTime;

use crate::record::FileRecord;

/// Best available date for placement: capture time, then digitization
/// time, then the filesystem timestamp, then the caller's `now`. The
/// caller samples `now` once per record so repeated queries agree.
pub fn best_date(record: &FileRecord, now: NaiveDateTime) -> NaiveDateTime {
    record
        .time_original
        .or(record.time_digitized)
        .or(record.fs_created_at)
        .unwrap_or(now)
}
