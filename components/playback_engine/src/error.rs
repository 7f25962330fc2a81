use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("required dependency not found: {0}")]
    PlayerNotFound(String),

    #[error("media file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("player exited abnormally (code {code:?}): {stderr}")]
    PlayerFailed { code: Option<i32>, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
