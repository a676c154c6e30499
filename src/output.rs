//! Persistence of result tables.
//!
//! Results stay in memory unless the caller asks for them to be written;
//! these helpers write CSV tables and JSON summaries into one directory.

use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;

/// Directory that receives post-processing results.
#[derive(Debug, Clone)]
pub struct OutputDirectory {
    path: PathBuf,
}

impl OutputDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A child directory, e.g. one per scenario of a batch.
    pub fn child(&self, name: &str) -> Self {
        Self::new(self.path.join(name))
    }

    /// Writes `rows` to `<name>.csv`, replacing any previous file.
    ///
    /// The header comes from the row type, so an empty table yields an
    /// empty file.
    pub fn write_csv<T: Serialize>(&self, name: &str, rows: &[T]) -> Result<PathBuf> {
        fs::create_dir_all(&self.path)?;
        let path = self.path.join(format!("{name}.csv"));

        let mut writer = WriterBuilder::new().has_headers(true).from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        info!(path = %path.display(), rows = rows.len(), "Wrote table");
        Ok(path)
    }

    /// Writes `value` as pretty-printed `<name>.json`.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.path)?;
        let path = self.path.join(format!("{name}.json"));

        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, value)?;

        info!(path = %path.display(), "Wrote summary");
        Ok(path)
    }
}

/// Appends a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
