pub mod date;
pub mod dest;
pub mod extract;
pub mod fsio;
pub mod record;
pub mod tags;

#[cfg(test)]
mod testutil;

use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use serde::{Deserialize, Serialize};

use record::FileRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortOptions {
    pub input_dir: PathBuf,
    pub output_root: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortResult {
    pub examined: u64,
    pub moved: u64,
    pub skipped: u64,
    pub errors: u64,
}

/// Move every regular file in the input directory into the dated layout
/// under the output root. Per-file failures are logged and counted but
/// never abort the run; only an unreadable input directory or an
/// uncreatable output root is fatal.
pub fn sort(options: &SortOptions) -> anyhow::Result<SortResult> {
    let entries = std::fs::read_dir(&options.input_dir)
        .with_context(|| format!("reading input directory {}", options.input_dir.display()))?;
    fsio::mkdir_all(&options.output_root)
        .with_context(|| format!("creating output directory {}", options.output_root.display()))?;

    // Regular files only; symlinks and subdirectories stay put.
    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("reading input directory {}", options.input_dir.display()))?;
        let Ok(kind) = entry.file_type() else {
            log::warn!("skipping {}: file type unavailable", entry.path().display());
            continue;
        };
        if !kind.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => log::warn!("skipping non-unicode file name {:?}", name),
        }
    }
    names.sort();

    let mut result = SortResult::default();
    for name in names {
        result.examined += 1;
        let mut record =
            FileRecord::new(name, options.input_dir.clone(), options.output_root.clone());

        if extract::is_skipped(&record.file_type) {
            log::debug!("skipping {} (type {})", record.file_name, record.file_type);
            result.skipped += 1;
            continue;
        }

        let source = record.source_path();
        match fsio::stat(&source) {
            Ok(times) => record.fs_created_at = Some(times.birth.unwrap_or(times.modified)),
            Err(err) => log::debug!("stat {}: {}", source.display(), err),
        }

        if let Some(format) = extract::detect(&record.file_type) {
            match extract::extract_tags(format, &source) {
                Ok(dump) => tags::apply(&mut record, &dump),
                Err(err) => {
                    log::warn!("{}: metadata extraction failed: {}", record.file_name, err)
                }
            }
        }
        log::trace!("record: {}", record);

        let date = date::best_date(&record, Local::now().naive_local());
        let dir = dest::dest_dir(&record, date);
        if let Err(err) = fsio::mkdir_all(&dir) {
            log::error!("creating {}: {}", dir.display(), err);
        }
        let dest = dest::dest_path(&dir, &record.file_name);

        log::info!("{} -> {}", source.display(), dest.display());
        match fsio::rename(&source, &dest) {
            Ok(()) => result.moved += 1,
            Err(err) => {
                log::error!("moving {} to {}: {}", source.display(), dest.display(), err);
                result.errors += 1;
            }
        }
    }

    Ok(result)
}
