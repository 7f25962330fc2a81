use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};
use url::Url;

use crate::error::DownloadError;
use crate::progress::{parse_progress_line, ProgressUpdate};

/// Raw metadata as reported by the extraction engine
#[derive(Debug, Clone, Deserialize)]
pub struct EngineMetadata {
    pub title: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub channel_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub upload_date: Option<String>,
}

/// Seam between the downloader and the external extraction engine
#[async_trait]
pub trait DownloadEngine {
    /// Check that the engine binary is installed
    async fn check_available(&self) -> Result<(), DownloadError>;

    /// Fetch metadata for a video without downloading it
    async fn fetch_metadata(&self, url: &Url) -> Result<EngineMetadata, DownloadError>;

    /// Download a video to `output`, streaming progress as it runs
    async fn download(
        &self,
        url: &Url,
        output: &Path,
        format_selector: &str,
        progress: UnboundedSender<ProgressUpdate>,
    ) -> Result<(), DownloadError>;
}

pub struct YtDlp;

const YT_DLP: &str = "yt-dlp";

#[async_trait]
impl DownloadEngine for YtDlp {
    async fn check_available(&self) -> Result<(), DownloadError> {
        which::which(YT_DLP)
            .map(|_| ())
            .map_err(|_| DownloadError::DependencyNotFound(YT_DLP))
    }

    async fn fetch_metadata(&self, url: &Url) -> Result<EngineMetadata, DownloadError> {
        debug!("fetching metadata for {}", url);

        let output = Command::new(YT_DLP)
            .arg("--dump-json")
            .arg("--no-download")
            .arg(url.as_str())
            .output()
            .await?;

        if !output.status.success() {
            return Err(DownloadError::EngineFailed(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| DownloadError::EngineFailed(e.to_string()))
    }

    async fn download(
        &self,
        url: &Url,
        output: &Path,
        format_selector: &str,
        progress: UnboundedSender<ProgressUpdate>,
    ) -> Result<(), DownloadError> {
        let output_str = output
            .to_str()
            .ok_or_else(|| DownloadError::EngineFailed("invalid output path".to_string()))?;

        info!("downloading {} to {}", url, output.display());

        let mut child = Command::new(YT_DLP)
            .arg("-f")
            .arg(format_selector)
            .arg("--merge-output-format")
            .arg("mp4")
            .arg("--newline")
            .arg("-o")
            .arg(output_str)
            .arg(url.as_str())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Cancellation drops this future; take the engine process down
            // with it instead of leaving an orphaned download
            .kill_on_drop(true)
            .spawn()?;

        // Stream progress lines as the engine emits them. A closed receiver
        // just means nobody is listening anymore; the download continues.
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::EngineFailed("engine stdout unavailable".to_string()))?;
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(update) = parse_progress_line(&line) {
                let _ = progress.send(update);
            }
        }

        let result = child.wait_with_output().await?;
        if !result.status.success() {
            return Err(DownloadError::EngineFailed(
                String::from_utf8_lossy(&result.stderr).into_owned(),
            ));
        }

        Ok(())
    }
}
