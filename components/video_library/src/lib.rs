//! Video library component for VidVault
//!
//! Owns the persisted formats of the system: the per-video `.vinfo`
//! descriptor sidecars, the JSON download-history file, and the pure
//! retention logic that prunes that history. Also scans a download
//! directory into displayable library items.
//!
//! All file writes go through an atomic write-then-rename so readers
//! never observe a partially written descriptor or history array.

mod descriptor;
mod error;
mod format;
mod history;
mod prune;
mod scan;
mod store;
mod timestamp;

pub use descriptor::{AssetDescriptor, UNKNOWN};
pub use error::LibraryError;
pub use format::{format_count, format_duration, format_size, format_upload_date};
pub use history::HistoryEntry;
pub use prune::{prune, RetentionPeriod};
pub use scan::{scan_directory, LibraryItem, MEDIA_EXTENSIONS};
pub use store::{
    append_history, read_descriptor, read_history, vinfo_path_for, write_descriptor,
    write_history,
};
pub use timestamp::{
    legacy_to_download_time, resolve_entry_time, TimestampError, DOWNLOAD_TIME_FORMAT,
    LEGACY_TIMESTAMP_FORMAT,
};
