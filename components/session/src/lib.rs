//! Session component for VidVault
//!
//! Coordinates one background worker (a download or an external-player
//! playback) with the interactive layer. The [`SessionController`] owns
//! the worker, translates its signals into ordered [`SessionEvent`]s for
//! the UI, and performs all history/sidecar mutations itself so that the
//! persisted files only ever see one logical writer.

mod config;
mod controller;
mod error;
mod events;
mod task;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use error::SessionError;
pub use events::{SessionEvent, SessionStatus, TaskKind, TaskOutcome};
pub use task::TaskSpec;
