use std::fmt;
use std::path::PathBuf;

use video_library::AssetDescriptor;

/// What kind of work the active task performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Download,
    Playback,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download => write!(f, "download"),
            Self::Playback => write!(f, "playback"),
        }
    }
}

/// UI-facing session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Downloading,
    Playing,
}

/// Payload of a successful task
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Downloaded {
        path: PathBuf,
        vinfo_path: PathBuf,
        descriptor: AssetDescriptor,
    },
    PlaybackEnded,
}

/// State change delivered to the UI layer
///
/// For one task the sequence is `Started`, any number of `Progress`, then
/// exactly one of `Finished`/`Failed`/`Stopped`, in emission order.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Started(TaskKind),
    Progress(String),
    Finished(TaskOutcome),
    /// Terminal failure; the message is surfaced verbatim, nothing retries
    Failed(String),
    Stopped,
}

impl SessionEvent {
    /// Whether this event ends the task that emitted it
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Started(_) | Self::Progress(_))
    }
}
