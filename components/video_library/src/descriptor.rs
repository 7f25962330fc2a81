use serde::{Deserialize, Serialize};

use crate::format::{format_count, format_duration, format_upload_date};

/// Placeholder shown for any descriptor field that is missing
pub const UNKNOWN: &str = "unknown";

/// Per-video metadata, persisted as a `.vinfo` sidecar next to the media file.
///
/// Created once at download completion and never mutated afterwards. Every
/// field is optional on read so that a sidecar written by an older version
/// (or hand-edited) still renders; the `display_*` accessors substitute
/// [`UNKNOWN`] for anything absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    /// Local time of download completion, "YYYY-MM-DD HH:MM:SS"
    #[serde(default)]
    pub download_time: Option<String>,
    /// Requested resolution label, e.g. "1080p"
    #[serde(default)]
    pub resolution: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub container_format: Option<String>,
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub channel_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    /// Upload date as reported by the source site, "YYYYMMDD"
    #[serde(default)]
    pub upload_date: Option<String>,
}

impl AssetDescriptor {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn display_source_url(&self) -> &str {
        self.source_url.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn display_download_time(&self) -> &str {
        self.download_time.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn display_resolution(&self) -> &str {
        self.resolution.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn display_container_format(&self) -> &str {
        self.container_format.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn display_channel_name(&self) -> &str {
        self.channel_name.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn display_channel_url(&self) -> &str {
        self.channel_url.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn display_description(&self) -> &str {
        self.description.as_deref().unwrap_or("no description")
    }

    pub fn display_duration(&self) -> String {
        format_duration(self.duration)
    }

    pub fn display_upload_date(&self) -> String {
        format_upload_date(self.upload_date.as_deref())
    }

    pub fn display_view_count(&self) -> String {
        format_count(self.view_count)
    }

    pub fn display_like_count(&self) -> String {
        format_count(self.like_count)
    }
}
