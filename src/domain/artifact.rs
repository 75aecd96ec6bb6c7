//! Dump artifacts produced by a successful dump.
//!
//! An artifact is a file on local storage that the caller owns once it is
//! returned. Whoever delivers it to its final consumer is responsible for
//! deleting it (see [`DumpArtifact::into_temp_path`]).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tempfile::TempPath;

/// Timestamp layout embedded in export filenames (`YYYY-MM-DD_HHMMSS`)
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Length of a formatted [`EXPORT_TIMESTAMP_FORMAT`] timestamp
const EXPORT_TIMESTAMP_LEN: usize = 17;

/// A completed dump file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpArtifact {
    /// Location of the dump on local storage
    pub file_path: PathBuf,

    /// Name to present to the end consumer (download name, output file)
    pub suggested_filename: String,

    /// Size in bytes
    pub size_bytes: u64,

    /// Hex-encoded SHA-256 of the file contents
    pub sha256: String,

    /// When the dump finished
    pub created_at: DateTime<Local>,
}

impl DumpArtifact {
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Convert into a guard that deletes the file when dropped.
    ///
    /// Delivery code should take this before streaming so the file is removed
    /// even if delivery fails partway.
    pub fn into_temp_path(self) -> std::io::Result<TempPath> {
        TempPath::try_from_path(self.file_path)
    }

    /// Delete the artifact without delivering it
    pub fn discard(self) -> std::io::Result<()> {
        self.into_temp_path()?.close()
    }
}

/// Build `<prefix>_<database>_<YYYY-MM-DD_HHMMSS>.sql`
pub fn export_filename(prefix: &str, database: &str, at: &DateTime<Local>) -> String {
    format!(
        "{}_{}_{}.sql",
        prefix,
        database,
        at.format(EXPORT_TIMESTAMP_FORMAT)
    )
}

/// Recover the timestamp embedded by [`export_filename`].
///
/// The timestamp is read from the end of the name, so prefixes and database
/// names containing underscores are fine.
pub fn parse_export_timestamp(filename: &str) -> Option<NaiveDateTime> {
    let stem = filename.strip_suffix(".sql")?;
    let split = stem.len().checked_sub(EXPORT_TIMESTAMP_LEN)?;
    if !stem.is_char_boundary(split) || split == 0 || !stem[..split].ends_with('_') {
        return None;
    }
    NaiveDateTime::parse_from_str(&stem[split..], EXPORT_TIMESTAMP_FORMAT).ok()
}
