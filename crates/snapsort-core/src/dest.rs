//! Destination layout: where a record belongs under the output root.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::fsio;
use crate::record::{split_name, FileRecord};

/// Directory for a record, before filename collision handling:
/// `<root>/[misc/<type>/]YYYY/YYYY-MM-DD/[<camera>/]`. An empty file type
/// contributes no component, so extensionless files land in `misc/` flat.
pub fn dest_dir(record: &FileRecord, date: NaiveDateTime) -> PathBuf {
    let mut dir = record.output_root.clone();
    if !record.has_exif {
        dir.push("misc");
        if !record.file_type.is_empty() {
            dir.push(&record.file_type);
        }
    }
    dir.push(date.format("%Y").to_string());
    dir.push(date.format("%Y-%m-%d").to_string());

    let camera = camera_name(record);
    if !camera.is_empty() {
        dir.push(&camera);
    }
    dir
}

/// Maker and model joined with a single space, trimmed at both ends.
pub fn camera_name(record: &FileRecord) -> String {
    format!("{} {}", record.camera_maker, record.camera_model)
        .trim()
        .to_string()
}

/// Final path inside `dir`: the original name, or `stem-N.ext` counted up
/// from 1 until a free name turns up. Probing assumes this run is the
/// only writer of the output tree.
pub fn dest_path(dir: &Path, file_name: &str) -> PathBuf {
    let dest = dir.join(file_name);
    if !fsio::exists(&dest) {
        return dest;
    }
    let (stem, ext) = split_name(file_name);
    let mut counter = 1u32;
    loop {
        let candidate = dir.join(format!("{stem}-{counter}{ext}"));
        if !fsio::exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
