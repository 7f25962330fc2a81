//! Persistence for descriptor sidecars and the history file
//!
//! Writes go to a temp file in the target directory and are renamed into
//! place, so a reader never sees a half-written JSON document. The history
//! append is a read-modify-write with no cross-process protection; the
//! session controller serializes all mutations (single active task) and
//! that is the only supported usage.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::descriptor::AssetDescriptor;
use crate::error::LibraryError;
use crate::history::HistoryEntry;

/// Extension of descriptor sidecar files
const VINFO_EXTENSION: &str = "vinfo";

/// Sidecar path for a media file: same base name, `.vinfo` extension
pub fn vinfo_path_for(media_path: &Path) -> PathBuf {
    media_path.with_extension(VINFO_EXTENSION)
}

/// Write a descriptor sidecar, atomically relative to readers
pub fn write_descriptor(path: &Path, descriptor: &AssetDescriptor) -> Result<(), LibraryError> {
    write_json_atomic(path, descriptor)?;
    debug!("wrote descriptor {}", path.display());
    Ok(())
}

/// Read a descriptor sidecar
///
/// Absent file is `NotFound`, unparseable JSON is `Malformed`; a parsed
/// descriptor may still have any number of missing fields.
pub fn read_descriptor(path: &Path) -> Result<AssetDescriptor, LibraryError> {
    let bytes = read_existing(path)?;
    serde_json::from_slice(&bytes).map_err(|source| LibraryError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the full history, oldest first
///
/// An absent history file is an empty history, not an error. Malformed
/// JSON is surfaced; the file is left untouched for the user to inspect.
pub fn read_history(path: &Path) -> Result<Vec<HistoryEntry>, LibraryError> {
    let bytes = match read_existing(path) {
        Ok(bytes) => bytes,
        Err(LibraryError::NotFound(_)) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    serde_json::from_slice(&bytes).map_err(|source| LibraryError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Append one entry to the history file
///
/// Read-modify-write of the whole array. A malformed existing file aborts
/// the append rather than silently discarding the old entries.
pub fn append_history(path: &Path, entry: HistoryEntry) -> Result<(), LibraryError> {
    let mut history = read_history(path)?;
    history.push(entry);
    write_history(path, &history)
}

/// Rewrite the whole history file atomically
pub fn write_history(path: &Path, history: &[HistoryEntry]) -> Result<(), LibraryError> {
    write_json_atomic(path, &history)?;
    debug!("wrote {} history entries to {}", history.len(), path.display());
    Ok(())
}

fn read_existing(path: &Path) -> Result<Vec<u8>, LibraryError> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(LibraryError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Serialize as pretty-printed UTF-8 JSON (non-ASCII preserved) and rename
/// into place. Either the full write lands or the prior file is untouched.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), LibraryError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let json = serde_json::to_vec_pretty(value).map_err(|source| LibraryError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(&json)?;
    temp.persist(path).map_err(|e| LibraryError::Io(e.error))?;
    Ok(())
}
