use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::descriptor::AssetDescriptor;

/// One logged past download
///
/// A history entry is a copy of the descriptor plus the on-disk locations
/// of the media file and its sidecar. The history file is a single JSON
/// array of these, in append (chronological) order.
///
/// Entries written by old versions carry a `timestamp` field
/// ("YYYYMMDD_HHMMSS") instead of the descriptor's `download_time`;
/// readers accept both, new entries always carry `download_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub descriptor: AssetDescriptor,
    pub file_path: PathBuf,
    pub vinfo_path: PathBuf,
    /// Legacy download timestamp, only present in entries from old versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl HistoryEntry {
    pub fn new(
        descriptor: AssetDescriptor,
        file_path: impl Into<PathBuf>,
        vinfo_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            descriptor,
            file_path: file_path.into(),
            vinfo_path: vinfo_path.into(),
            timestamp: None,
        }
    }
}
