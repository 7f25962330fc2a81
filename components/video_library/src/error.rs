use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("malformed JSON in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
