use std::path::PathBuf;
use thiserror::Error;

use playback_engine::PlaybackError;
use video_downloader::DownloadError;
use video_library::LibraryError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("descriptor for {} carries no source URL", .0.display())]
    MissingSourceUrl(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
