//! Video download component for VidVault
//!
//! Wraps the external extraction engine (yt-dlp) behind the
//! [`DownloadEngine`] seam: fetch metadata first, derive the output file
//! name, run the download with a height-bounded format selector remuxed to
//! mp4, and hand back the resolved [`AssetDescriptor`] together with the
//! concrete output path. Progress flows through an unbounded channel as
//! the engine reports it.

mod error;
mod progress;
mod resolution;
mod ytdlp;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;
use url::Url;

use video_library::{AssetDescriptor, DOWNLOAD_TIME_FORMAT};

pub use error::DownloadError;
pub use progress::{parse_progress_line, ProgressUpdate};
pub use resolution::Resolution;
pub use ytdlp::{DownloadEngine, EngineMetadata, YtDlp};

/// Stamp appended to output file names to keep repeated downloads distinct
const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub struct VideoDownloader {
    download_dir: PathBuf,
    engine: Arc<dyn DownloadEngine + Send + Sync>,
}

impl VideoDownloader {
    /// Create a downloader storing files in the given directory
    pub async fn new(download_dir: impl AsRef<Path>) -> Result<Self, DownloadError> {
        Self::with_engine(download_dir, Arc::new(YtDlp)).await
    }

    /// Create a downloader with a specific engine implementation
    pub async fn with_engine(
        download_dir: impl AsRef<Path>,
        engine: Arc<dyn DownloadEngine + Send + Sync>,
    ) -> Result<Self, DownloadError> {
        engine.check_available().await?;

        let download_dir = download_dir.as_ref().to_owned();
        tokio::fs::create_dir_all(&download_dir).await?;

        Ok(Self {
            download_dir,
            engine,
        })
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Download a video, returning its path and resolved descriptor
    ///
    /// Metadata is fetched before the download so the output name can carry
    /// the video title; the descriptor's `download_time` is the completion
    /// time. Engine failures are terminal, retrying is up to the user.
    pub async fn download(
        &self,
        url: &str,
        resolution: &Resolution,
        progress: UnboundedSender<ProgressUpdate>,
    ) -> Result<(PathBuf, AssetDescriptor), DownloadError> {
        let url = Url::parse(url).map_err(|e| DownloadError::InvalidUrl(e.to_string()))?;

        let metadata = self.engine.fetch_metadata(&url).await?;
        let output = self.download_dir.join(output_file_name(
            &metadata.title,
            Local::now().naive_local(),
        ));

        self.engine
            .download(&url, &output, &resolution.format_selector(), progress)
            .await?;

        let completed_at = Local::now().naive_local();
        info!("downloaded {:?} to {}", metadata.title, output.display());

        let descriptor = AssetDescriptor {
            title: Some(metadata.title),
            source_url: Some(url.to_string()),
            download_time: Some(completed_at.format(DOWNLOAD_TIME_FORMAT).to_string()),
            resolution: Some(resolution.label()),
            duration: metadata.duration.map(|d| d.round() as u64),
            container_format: metadata.format,
            channel_name: metadata.channel,
            channel_url: metadata.channel_url,
            description: metadata.description,
            view_count: metadata.view_count,
            like_count: metadata.like_count,
            upload_date: metadata.upload_date,
        };

        Ok((output, descriptor))
    }
}

/// Output file name: sanitized title plus a "YYYYMMDD_HHMMSS" stamp
fn output_file_name(title: &str, stamp: NaiveDateTime) -> String {
    format!(
        "{}_{}.mp4",
        sanitize_filename::sanitize(title),
        stamp.format(FILE_STAMP_FORMAT)
    )
}
