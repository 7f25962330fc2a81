//! Playback component for VidVault
//!
//! Plays downloaded files through an external player process (ffplay by
//! default) with a fixed window size and exit-on-end behavior. The engine
//! blocks on the subprocess off the interactive path; callers stop it
//! through a [`CancellationToken`], which kills the player forcefully.
//! The player may ignore polite termination mid-decode, so stop goes
//! straight to a hard kill and waits briefly for exit confirmation.

mod error;

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use error::PlaybackError;

/// How a playback run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The player reached end of stream (or was closed by the user)
    Finished,
    /// Playback was stopped through the cancellation token
    Stopped,
}

const FFPLAY: &str = "ffplay";
const WINDOW_WIDTH: &str = "800";
const WINDOW_HEIGHT: &str = "600";

/// Grace period for the killed player to actually exit
const STOP_WAIT: Duration = Duration::from_secs(2);

pub struct PlaybackEngine {
    program: String,
}

impl PlaybackEngine {
    /// Create an engine driving the default player (ffplay)
    pub fn new() -> Result<Self, PlaybackError> {
        which::which(FFPLAY)
            .map_err(|_| PlaybackError::PlayerNotFound(FFPLAY.to_string()))?;
        Ok(Self {
            program: FFPLAY.to_string(),
        })
    }

    /// Create an engine driving a specific player binary
    ///
    /// The binary must accept ffplay-style arguments; tests use shell
    /// stand-ins.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Play a file to completion or until the token is cancelled
    ///
    /// Blocks on the player subprocess; run this on a worker, not the
    /// interactive path. A nonzero player exit is an error carrying the
    /// captured stderr; a stop-induced kill is the `Stopped` outcome, and
    /// kill failures are logged, never surfaced.
    pub async fn play(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<PlaybackOutcome, PlaybackError> {
        if !path.is_file() {
            return Err(PlaybackError::FileNotFound(path.to_path_buf()));
        }

        let window_title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "playback".to_string());

        info!("playing {} with {}", path.display(), self.program);

        let mut child = Command::new(&self.program)
            .arg("-window_title")
            .arg(window_title)
            .arg("-x")
            .arg(WINDOW_WIDTH)
            .arg("-y")
            .arg(WINDOW_HEIGHT)
            .arg("-autoexit")
            .arg("-loglevel")
            .arg("error")
            .arg(path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain stderr concurrently so a chatty player cannot block on a
        // full pipe.
        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut captured = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut captured).await;
            }
            captured
        });

        tokio::select! {
            status = child.wait() => {
                let status = status?;
                let stderr = stderr_task.await.unwrap_or_default();

                if status.success() {
                    debug!("player exited cleanly");
                    Ok(PlaybackOutcome::Finished)
                } else {
                    Err(PlaybackError::PlayerFailed {
                        code: status.code(),
                        stderr: stderr.trim().to_string(),
                    })
                }
            }
            _ = cancel.cancelled() => {
                kill_player(&mut child).await;
                stderr_task.abort();
                Ok(PlaybackOutcome::Stopped)
            }
        }
    }
}

/// Forcefully terminate the player and wait briefly for exit confirmation
///
/// Never fails: termination problems are logged and the caller proceeds
/// regardless.
async fn kill_player(child: &mut Child) {
    #[cfg(windows)]
    {
        // taskkill /T takes the player's child processes down with it
        if let Some(pid) = child.id() {
            let result = Command::new("taskkill")
                .args(["/F", "/T", "/PID", &pid.to_string()])
                .output()
                .await;
            if let Err(e) = result {
                warn!("taskkill failed for player pid {}: {}", pid, e);
            }
        }
    }

    #[cfg(not(windows))]
    if let Err(e) = child.start_kill() {
        warn!("failed to kill player: {}", e);
    }

    match tokio::time::timeout(STOP_WAIT, child.wait()).await {
        Ok(Ok(status)) => debug!("player exited after stop: {}", status),
        Ok(Err(e)) => warn!("error waiting for killed player: {}", e),
        Err(_) => warn!("player did not exit within {:?} of stop", STOP_WAIT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_missing_file_rejected_before_spawn() {
        let engine = PlaybackEngine::with_program("ffplay-does-not-matter");
        let cancel = CancellationToken::new();

        let result = engine
            .play(Path::new("/no/such/video.mp4"), &cancel)
            .await;
        assert_matches!(result, Err(PlaybackError::FileNotFound(_)));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;
        use std::time::Instant;
        use tempfile::TempDir;

        /// Write an executable script that stands in for the player
        fn fake_player(dir: &TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("fake-player.sh");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn media_file(dir: &TempDir) -> PathBuf {
            let path = dir.path().join("clip.mp4");
            std::fs::write(&path, b"fake video").unwrap();
            path
        }

        #[tokio::test]
        async fn test_clean_exit_is_finished() {
            let dir = TempDir::new().unwrap();
            let player = fake_player(&dir, "exit 0");
            let media = media_file(&dir);

            let engine = PlaybackEngine::with_program(player.to_str().unwrap());
            let outcome = engine.play(&media, &CancellationToken::new()).await.unwrap();
            assert_eq!(outcome, PlaybackOutcome::Finished);
        }

        #[tokio::test]
        async fn test_nonzero_exit_carries_stderr() {
            let dir = TempDir::new().unwrap();
            let player = fake_player(&dir, "echo 'decode error' >&2; exit 3");
            let media = media_file(&dir);

            let engine = PlaybackEngine::with_program(player.to_str().unwrap());
            let result = engine.play(&media, &CancellationToken::new()).await;

            assert_matches!(
                result,
                Err(PlaybackError::PlayerFailed { code: Some(3), ref stderr })
                    if stderr.contains("decode error")
            );
        }

        #[tokio::test]
        async fn test_cancellation_kills_player() {
            let dir = TempDir::new().unwrap();
            let player = fake_player(&dir, "sleep 30");
            let media = media_file(&dir);

            let engine = PlaybackEngine::with_program(player.to_str().unwrap());
            let cancel = CancellationToken::new();

            let canceller = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                canceller.cancel();
            });

            let started = Instant::now();
            let outcome = engine.play(&media, &cancel).await.unwrap();

            assert_eq!(outcome, PlaybackOutcome::Stopped);
            assert!(
                started.elapsed() < Duration::from_secs(10),
                "stop should not wait for the 30s sleep"
            );
        }

        #[tokio::test]
        async fn test_already_cancelled_token_stops_immediately() {
            let dir = TempDir::new().unwrap();
            let player = fake_player(&dir, "sleep 30");
            let media = media_file(&dir);

            let engine = PlaybackEngine::with_program(player.to_str().unwrap());
            let cancel = CancellationToken::new();
            cancel.cancel();

            let outcome = engine.play(&media, &cancel).await.unwrap();
            assert_eq!(outcome, PlaybackOutcome::Stopped);
        }
    }
}
