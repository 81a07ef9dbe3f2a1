//! Thin wrappers around std::fs. File times come back as local wall-clock
//! values; all errors surface verbatim and nothing is retried.

use std::fs::{self, DirBuilder};
use std::io;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime};

/// Timestamps reported by the filesystem.
pub struct FileTimes {
    /// Birth time, None where the platform or filesystem lacks one
    pub birth: Option<NaiveDateTime>,
    pub modified: NaiveDateTime,
}

fn to_local(t: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(t).naive_local()
}

/// Stat a file for its timestamps.
pub fn stat(path: &Path) -> io::Result<FileTimes> {
    let meta = fs::metadata(path)?;
    Ok(FileTimes {
        birth: meta.created().ok().map(to_local),
        modified: to_local(meta.modified()?),
    })
}

/// Create a directory and all missing parents, mode 0750 on unix.
/// Succeeds if the directory already exists.
pub fn mkdir_all(path: &Path) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o750);
    }
    builder.create(path)
}

/// Move a file. Cross-device renames fail with the OS error.
pub fn rename(src: &Path, dst: &Path) -> io::Result<()> {
    fs::rename(src, dst)
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}
