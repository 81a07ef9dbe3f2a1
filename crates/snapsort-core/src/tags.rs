//! Interpretation of the flat tag list into record fields.

use chrono::{DateTime, Local, NaiveDateTime};

use crate::extract::TagDump;
use crate::record::FileRecord;

/// EXIF datetime layout, e.g. `2021:06:15 10:30:00`.
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Fold a tag dump into the record. Only the known tags are read; a
/// repeated tag keeps its last occurrence, a failed parse included.
pub fn apply(record: &mut FileRecord, dump: &TagDump) {
    record.has_exif = dump.has_exif || !dump.tags.is_empty();

    if dump.tags.is_empty() {
        if dump.has_exif {
            log::debug!("{}: EXIF data is present but empty", record.file_name);
        }
        return;
    }

    for tag in &dump.tags {
        let value = tag.value.as_str();
        match tag.name.trim() {
            "Make" => record.camera_maker = value.trim().to_string(),
            "Model" => record.camera_model = value.trim().to_string(),
            "DateTimeOriginal" => record.time_original = parse_exif_datetime(value),
            "DateTimeDigitized" => record.time_digitized = parse_exif_datetime(value),
            "FileDateTime" => record.file_date_time = parse_unix_seconds(value),
            _ => {}
        }
    }
}

/// Wall-clock parse, no timezone involved. Exact format only.
fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, EXIF_DATE_FORMAT).ok()
}

/// Decimal unix seconds to local wall clock.
fn parse_unix_seconds(value: &str) -> Option<NaiveDateTime> {
    let secs: i64 = value.parse().ok()?;
    let utc = DateTime::from_timestamp(secs, 0)?;
    Some(utc.with_timezone(&Local).naive_local())
}
