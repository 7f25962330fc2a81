use std::path::PathBuf;

/// Explicit session configuration, owned by the controller
///
/// No ambient process state: collaborators receive the download directory
/// and history location from here.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Where downloaded media and their sidecars land
    pub download_dir: PathBuf,
    /// The single JSON-array history file
    pub history_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            history_path: PathBuf::from("data").join("history.json"),
        }
    }
}
