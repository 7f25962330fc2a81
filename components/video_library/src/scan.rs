use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use tracing::warn;

use crate::descriptor::AssetDescriptor;
use crate::error::LibraryError;
use crate::store::{read_descriptor, vinfo_path_for};
use crate::timestamp::DOWNLOAD_TIME_FORMAT;

/// Media file extensions recognized by the library scan
pub const MEDIA_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov"];

/// One displayable row of the download directory
#[derive(Debug, Clone)]
pub struct LibraryItem {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    /// From the sidecar when present and parseable, else the file mtime
    pub downloaded_at: Option<NaiveDateTime>,
    /// Sidecar contents, when a readable sidecar exists
    pub descriptor: Option<AssetDescriptor>,
}

/// Scan a download directory for media files, sorted by file name
///
/// This is a display-only path: a missing or broken sidecar degrades the
/// row to filesystem information instead of failing the scan.
pub fn scan_directory(dir: &Path) -> Result<Vec<LibraryItem>, LibraryError> {
    let mut items = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !is_media_file(&path) {
            continue;
        }

        let metadata = entry.metadata()?;
        let descriptor = match read_descriptor(&vinfo_path_for(&path)) {
            Ok(descriptor) => Some(descriptor),
            Err(LibraryError::NotFound(_)) => None,
            Err(e) => {
                warn!("unreadable sidecar for {}: {}", path.display(), e);
                None
            }
        };

        let downloaded_at = descriptor
            .as_ref()
            .and_then(|d| d.download_time.as_deref())
            .and_then(|t| NaiveDateTime::parse_from_str(t, DOWNLOAD_TIME_FORMAT).ok())
            .or_else(|| {
                metadata
                    .modified()
                    .ok()
                    .map(|mtime| DateTime::<Local>::from(mtime).naive_local())
            });

        items.push(LibraryItem {
            file_name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            downloaded_at,
            descriptor,
            path,
        });
    }

    items.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(items)
}

fn is_media_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext))
}
