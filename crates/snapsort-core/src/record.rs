use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Everything known about one candidate file. Created from a directory
/// entry, enriched by the extractors, queried for placement, discarded.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    /// Just the filename, never a path
    pub file_name: String,
    /// Lowercase extension without the dot, "" if none
    pub file_type: String,
    /// Directory the file currently lives in
    pub original_dir: PathBuf,
    /// Root of the sorted output tree
    pub output_root: PathBuf,
    /// Birth time where the platform reports one, else mtime
    pub fs_created_at: Option<NaiveDateTime>,
    /// Whether the container held EXIF structure
    pub has_exif: bool,
    /// EXIF Make, trimmed
    pub camera_maker: String,
    /// EXIF Model, trimmed
    pub camera_model: String,
    /// EXIF DateTimeOriginal
    pub time_original: Option<NaiveDateTime>,
    /// EXIF DateTimeDigitized
    pub time_digitized: Option<NaiveDateTime>,
    /// EXIF FileDateTime (unix seconds)
    pub file_date_time: Option<NaiveDateTime>,
}

impl FileRecord {
    pub fn new(file_name: String, original_dir: PathBuf, output_root: PathBuf) -> Self {
        let file_type = file_type_of(&file_name);
        Self {
            file_name,
            file_type,
            original_dir,
            output_root,
            fs_created_at: None,
            has_exif: false,
            camera_maker: String::new(),
            camera_model: String::new(),
            time_original: None,
            time_digitized: None,
            file_date_time: None,
        }
    }

    /// Where the file currently is.
    pub fn source_path(&self) -> PathBuf {
        self.original_dir.join(&self.file_name)
    }
}

impl fmt::Display for FileRecord {
    /// JSON dump, for diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serde_json::to_string(self).unwrap_or_default())
    }
}

/// Lowercase suffix after the last dot, "" when there is none.
/// Leading-dot names classify by their suffix (".dropbox" -> "dropbox"),
/// which is what keeps marker files on the skip list.
pub fn file_type_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Split a filename at its last dot into (stem, extension including the
/// dot). The extension is "" when the name has no dot.
pub fn split_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(i) => file_name.split_at(i),
        None => (file_name, ""),
    }
}
