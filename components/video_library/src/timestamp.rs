use chrono::NaiveDateTime;
use thiserror::Error;

use crate::history::HistoryEntry;

/// Format of `download_time` in descriptors and new history entries
pub const DOWNLOAD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of the legacy `timestamp` field in old history entries
pub const LEGACY_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Error, PartialEq)]
pub enum TimestampError {
    #[error("entry carries no download time")]
    Missing,

    #[error("unparseable download time: {0:?}")]
    Unparseable(String),
}

/// Resolve the download time of a history entry
///
/// Prefers the descriptor's `download_time`; falls back to the legacy
/// `timestamp` field. Parse failures are an explicit error so that callers
/// choose their own policy (the pruner keeps such entries) instead of the
/// failure being swallowed.
pub fn resolve_entry_time(entry: &HistoryEntry) -> Result<NaiveDateTime, TimestampError> {
    if let Some(time) = entry.descriptor.download_time.as_deref() {
        return NaiveDateTime::parse_from_str(time, DOWNLOAD_TIME_FORMAT)
            .map_err(|_| TimestampError::Unparseable(time.to_string()));
    }

    match entry.timestamp.as_deref() {
        Some(legacy) => NaiveDateTime::parse_from_str(legacy, LEGACY_TIMESTAMP_FORMAT)
            .map_err(|_| TimestampError::Unparseable(legacy.to_string())),
        None => Err(TimestampError::Missing),
    }
}

/// Reformat a legacy "YYYYMMDD_HHMMSS" timestamp as "YYYY-MM-DD HH:MM:SS"
pub fn legacy_to_download_time(timestamp: &str) -> Result<String, TimestampError> {
    NaiveDateTime::parse_from_str(timestamp, LEGACY_TIMESTAMP_FORMAT)
        .map(|t| t.format(DOWNLOAD_TIME_FORMAT).to_string())
        .map_err(|_| TimestampError::Unparseable(timestamp.to_string()))
}
