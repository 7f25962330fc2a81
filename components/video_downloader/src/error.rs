use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("required dependency not found: {0}")]
    DependencyNotFound(&'static str),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid resolution label {0:?}, expected a height with a 'p' suffix like \"1080p\"")]
    InvalidResolution(String),

    #[error("download engine failed: {0}")]
    EngineFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
