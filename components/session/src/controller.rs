use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::RwLock;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use playback_engine::PlaybackEngine;
use video_downloader::{DownloadEngine, YtDlp};
use video_library::{
    append_history, prune, read_descriptor, read_history, scan_directory, vinfo_path_for,
    write_descriptor, write_history, AssetDescriptor, HistoryEntry, LibraryError, LibraryItem,
    RetentionPeriod,
};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::events::{SessionEvent, SessionStatus, TaskKind, TaskOutcome};
use crate::task::{run_worker, TaskSpec, WorkerEvent};

/// Handles to the one running (or just-terminated) worker
struct ActiveWorker {
    cancel: CancellationToken,
    worker: JoinHandle<()>,
    pump: JoinHandle<()>,
}

/// Owns the single background worker and all persistent session state
///
/// At most one worker is alive at a time; every start stops and joins the
/// previous worker first. The controller's event pump is the single
/// consumer of worker signals, performs download-completion persistence,
/// and forwards [`SessionEvent`]s to the UI receiver in emission order.
/// The history and sidecar files therefore see one logical writer at a
/// time; this scheme is not safe across multiple process instances.
pub struct SessionController {
    config: SessionConfig,
    engine: Arc<dyn DownloadEngine + Send + Sync>,
    player: Arc<PlaybackEngine>,
    events_tx: UnboundedSender<SessionEvent>,
    status: Arc<RwLock<SessionStatus>>,
    active: Option<ActiveWorker>,
}

impl SessionController {
    /// Create a controller over the real engine and player
    pub fn new(
        config: SessionConfig,
    ) -> Result<(Self, UnboundedReceiver<SessionEvent>), SessionError> {
        let player = PlaybackEngine::new()?;
        Ok(Self::with_collaborators(
            config,
            Arc::new(YtDlp),
            Arc::new(player),
        ))
    }

    /// Create a controller with injected collaborators
    pub fn with_collaborators(
        config: SessionConfig,
        engine: Arc<dyn DownloadEngine + Send + Sync>,
        player: Arc<PlaybackEngine>,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events_tx, events_rx) = unbounded_channel();
        let controller = Self {
            config,
            engine,
            player,
            events_tx,
            status: Arc::new(RwLock::new(SessionStatus::Idle)),
            active: None,
        };
        (controller, events_rx)
    }

    /// Launch a task, stopping any running one first
    ///
    /// The previous worker is fully terminated and its events flushed
    /// before the new task's `Started` event is emitted.
    pub async fn start(&mut self, spec: TaskSpec) {
        self.stop().await;

        let kind = spec.kind();
        info!("starting {} task", kind);
        *self.status.write() = match kind {
            TaskKind::Download => SessionStatus::Downloading,
            TaskKind::Playback => SessionStatus::Playing,
        };
        let _ = self.events_tx.send(SessionEvent::Started(kind));

        let cancel = CancellationToken::new();
        let (worker_tx, worker_rx) = unbounded_channel();

        let worker = tokio::spawn(run_worker(
            spec,
            Arc::clone(&self.engine),
            Arc::clone(&self.player),
            self.config.download_dir.clone(),
            cancel.clone(),
            worker_tx,
        ));
        let pump = tokio::spawn(pump_worker_events(
            worker_rx,
            self.config.history_path.clone(),
            self.events_tx.clone(),
            Arc::clone(&self.status),
        ));

        self.active = Some(ActiveWorker {
            cancel,
            worker,
            pump,
        });
    }

    /// Stop the active task, if any
    ///
    /// Waits for the worker to fully terminate and its events to be
    /// delivered. No-op when idle; safe to call any number of times.
    pub async fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        active.cancel.cancel();
        if let Err(e) = active.worker.await {
            warn!("worker task panicked: {}", e);
        }
        if let Err(e) = active.pump.await {
            warn!("event pump panicked: {}", e);
        }
        *self.status.write() = SessionStatus::Idle;
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.read()
    }

    pub fn download_dir(&self) -> &Path {
        &self.config.download_dir
    }

    /// Point the session at a different download directory
    pub fn set_download_dir(&mut self, dir: impl Into<PathBuf>) -> Result<(), SessionError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        self.config.download_dir = dir;
        Ok(())
    }

    /// Read the full history for display, oldest first
    pub fn history(&self) -> Result<Vec<HistoryEntry>, SessionError> {
        Ok(read_history(&self.config.history_path)?)
    }

    /// Remove history entries within the retention period
    ///
    /// Returns the number of entries removed. The rewrite is atomic: on
    /// any failure the prior history file is left untouched.
    pub fn prune_history(&self, period: RetentionPeriod) -> Result<usize, SessionError> {
        let history = read_history(&self.config.history_path)?;
        let kept = prune(&history, period, Local::now().naive_local());
        let removed = history.len() - kept.len();

        write_history(&self.config.history_path, &kept)?;
        info!("pruned {} history entries ({})", removed, period);
        Ok(removed)
    }

    /// Read the descriptor sidecar of a downloaded media file
    pub fn video_info(&self, media_path: &Path) -> Result<AssetDescriptor, SessionError> {
        Ok(read_descriptor(&vinfo_path_for(media_path))?)
    }

    /// Resolve the original source URL of a downloaded media file
    pub fn original_url(&self, media_path: &Path) -> Result<String, SessionError> {
        self.video_info(media_path)?
            .source_url
            .ok_or_else(|| SessionError::MissingSourceUrl(media_path.to_path_buf()))
    }

    /// List the media files in the download directory
    pub fn list_videos(&self) -> Result<Vec<LibraryItem>, SessionError> {
        Ok(scan_directory(&self.config.download_dir)?)
    }
}

/// Single consumer of one worker's events
///
/// Persists download results before the finish event reaches the UI, so a
/// `Finished` download always has its sidecar and history entry on disk.
async fn pump_worker_events(
    mut rx: UnboundedReceiver<WorkerEvent>,
    history_path: PathBuf,
    ui_tx: UnboundedSender<SessionEvent>,
    status: Arc<RwLock<SessionStatus>>,
) {
    while let Some(event) = rx.recv().await {
        let forwarded = match event {
            WorkerEvent::Progress(text) => SessionEvent::Progress(text),
            WorkerEvent::Downloaded { path, descriptor } => {
                match persist_download(&history_path, &path, &descriptor) {
                    Ok(vinfo_path) => SessionEvent::Finished(TaskOutcome::Downloaded {
                        path,
                        vinfo_path,
                        descriptor,
                    }),
                    Err(e) => SessionEvent::Failed(format!(
                        "download succeeded but saving metadata failed: {}",
                        e
                    )),
                }
            }
            WorkerEvent::PlaybackEnded => SessionEvent::Finished(TaskOutcome::PlaybackEnded),
            WorkerEvent::Failed(message) => SessionEvent::Failed(message),
            WorkerEvent::Stopped => SessionEvent::Stopped,
        };

        let terminal = forwarded.is_terminal();
        let _ = ui_tx.send(forwarded);
        if terminal {
            *status.write() = SessionStatus::Idle;
        }
    }
}

fn persist_download(
    history_path: &Path,
    media_path: &Path,
    descriptor: &AssetDescriptor,
) -> Result<PathBuf, LibraryError> {
    let vinfo_path = vinfo_path_for(media_path);
    write_descriptor(&vinfo_path, descriptor)?;
    append_history(
        history_path,
        HistoryEntry::new(descriptor.clone(), media_path, &vinfo_path),
    )?;
    Ok(vinfo_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::mpsc::UnboundedSender as Sender;
    use url::Url;
    use video_downloader::{DownloadError, EngineMetadata, ProgressUpdate, Resolution};

    fn metadata() -> EngineMetadata {
        EngineMetadata {
            title: "Test Video".to_string(),
            duration: Some(213.0),
            format: Some("137+140".to_string()),
            channel: Some("Test Channel".to_string()),
            channel_url: None,
            description: None,
            view_count: Some(42),
            like_count: None,
            upload_date: Some("20230615".to_string()),
        }
    }

    /// Engine that finishes immediately with one progress report
    struct InstantEngine;

    #[async_trait]
    impl DownloadEngine for InstantEngine {
        async fn check_available(&self) -> Result<(), DownloadError> {
            Ok(())
        }

        async fn fetch_metadata(&self, _url: &Url) -> Result<EngineMetadata, DownloadError> {
            Ok(metadata())
        }

        async fn download(
            &self,
            _url: &Url,
            output: &Path,
            _format_selector: &str,
            progress: Sender<ProgressUpdate>,
        ) -> Result<(), DownloadError> {
            let _ = progress.send(ProgressUpdate {
                percent: 100.0,
                rate: Some("1.50MiB/s".to_string()),
            });
            std::fs::write(output, b"fake video")?;
            Ok(())
        }
    }

    /// Engine whose download never completes on its own
    struct HangingEngine;

    #[async_trait]
    impl DownloadEngine for HangingEngine {
        async fn check_available(&self) -> Result<(), DownloadError> {
            Ok(())
        }

        async fn fetch_metadata(&self, _url: &Url) -> Result<EngineMetadata, DownloadError> {
            Ok(metadata())
        }

        async fn download(
            &self,
            _url: &Url,
            _output: &Path,
            _format_selector: &str,
            _progress: Sender<ProgressUpdate>,
        ) -> Result<(), DownloadError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    /// Engine that always fails with a fixed message
    struct FailingEngine;

    #[async_trait]
    impl DownloadEngine for FailingEngine {
        async fn check_available(&self) -> Result<(), DownloadError> {
            Ok(())
        }

        async fn fetch_metadata(&self, _url: &Url) -> Result<EngineMetadata, DownloadError> {
            Err(DownloadError::EngineFailed(
                "HTTP Error 403: Forbidden".to_string(),
            ))
        }

        async fn download(
            &self,
            _url: &Url,
            _output: &Path,
            _format_selector: &str,
            _progress: Sender<ProgressUpdate>,
        ) -> Result<(), DownloadError> {
            unreachable!("metadata fetch already failed")
        }
    }

    fn test_config(dir: &TempDir) -> SessionConfig {
        SessionConfig {
            download_dir: dir.path().join("downloads"),
            history_path: dir.path().join("data").join("history.json"),
        }
    }

    fn controller_with(
        dir: &TempDir,
        engine: Arc<dyn DownloadEngine + Send + Sync>,
    ) -> (SessionController, UnboundedReceiver<SessionEvent>) {
        SessionController::with_collaborators(
            test_config(dir),
            engine,
            Arc::new(PlaybackEngine::with_program("unused-player")),
        )
    }

    fn download_spec() -> TaskSpec {
        TaskSpec::Download {
            url: "https://example.com/watch?v=abc".to_string(),
            resolution: Resolution::default(),
        }
    }

    /// Collect events until (and including) the first terminal one
    async fn drain_until_terminal(
        events: &mut UnboundedReceiver<SessionEvent>,
    ) -> Vec<SessionEvent> {
        let mut collected = Vec::new();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(10), events.recv())
                .await
                .expect("timed out waiting for a terminal event")
                .expect("event channel closed before a terminal event");
            let terminal = event.is_terminal();
            collected.push(event);
            if terminal {
                return collected;
            }
        }
    }

    #[tokio::test]
    async fn test_download_persists_sidecar_and_history() {
        let dir = TempDir::new().unwrap();
        let (mut controller, mut events) = controller_with(&dir, Arc::new(InstantEngine));

        controller.start(download_spec()).await;
        let collected = drain_until_terminal(&mut events).await;
        controller.stop().await;

        assert_matches!(collected[0], SessionEvent::Started(TaskKind::Download));
        assert!(collected.iter().any(
            |e| matches!(e, SessionEvent::Progress(text) if text.contains("download progress"))
        ));
        assert!(collected.iter().any(
            |e| matches!(e, SessionEvent::Progress(text) if text.contains("download complete"))
        ));

        let SessionEvent::Finished(TaskOutcome::Downloaded {
            path,
            vinfo_path,
            descriptor,
        }) = collected.last().unwrap()
        else {
            panic!("expected a Downloaded outcome, got {:?}", collected.last());
        };

        assert!(path.exists());
        assert!(vinfo_path.exists());
        assert_eq!(descriptor.display_title(), "Test Video");

        // Sidecar round-trips and the history gained exactly this entry
        let stored = controller.video_info(path).unwrap();
        assert_eq!(&stored, descriptor);
        let history = controller.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(&history[0].file_path, path);
        assert!(history[0].descriptor.download_time.is_some());

        assert_eq!(controller.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_failure_surfaces_engine_message_verbatim() {
        let dir = TempDir::new().unwrap();
        let (mut controller, mut events) = controller_with(&dir, Arc::new(FailingEngine));

        controller.start(download_spec()).await;
        let collected = drain_until_terminal(&mut events).await;
        controller.stop().await;

        assert_matches!(
            collected.last(),
            Some(SessionEvent::Failed(message))
                if message.contains("HTTP Error 403: Forbidden")
        );
        // Nothing was persisted for a failed download
        assert!(controller.history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_while_running_stops_old_task_first() {
        let dir = TempDir::new().unwrap();
        let (mut controller, mut events) = controller_with(&dir, Arc::new(HangingEngine));

        controller.start(download_spec()).await;
        assert_eq!(controller.status(), SessionStatus::Downloading);

        controller.start(download_spec()).await;
        controller.stop().await;

        // First task: Started then Stopped, fully flushed before the
        // second task's Started
        let collected = drain_until_terminal(&mut events).await;
        assert_matches!(collected[0], SessionEvent::Started(TaskKind::Download));
        assert_matches!(collected.last(), Some(SessionEvent::Stopped));

        let collected = drain_until_terminal(&mut events).await;
        assert_matches!(collected[0], SessionEvent::Started(TaskKind::Download));
        assert_matches!(collected.last(), Some(SessionEvent::Stopped));
    }

    #[tokio::test]
    async fn test_stop_is_a_repeatable_noop() {
        let dir = TempDir::new().unwrap();
        let (mut controller, _events) = controller_with(&dir, Arc::new(InstantEngine));

        // Never started: both calls are no-ops
        controller.stop().await;
        controller.stop().await;
        assert_eq!(controller.status(), SessionStatus::Idle);

        // After a finished task the worker is already gone; stopping twice
        // more is still fine
        controller.start(download_spec()).await;
        controller.stop().await;
        controller.stop().await;
        assert_eq!(controller.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_prune_rewrites_history() {
        let dir = TempDir::new().unwrap();
        let (controller, _events) = controller_with(&dir, Arc::new(InstantEngine));
        let config = test_config(&dir);

        let old = HistoryEntry::new(
            AssetDescriptor {
                title: Some("old".to_string()),
                download_time: Some("2001-01-01 00:00:00".to_string()),
                ..Default::default()
            },
            "/videos/old.mp4",
            "/videos/old.vinfo",
        );
        let recent = HistoryEntry::new(
            AssetDescriptor {
                title: Some("recent".to_string()),
                download_time: Some(
                    Local::now().naive_local().format("%Y-%m-%d %H:%M:%S").to_string(),
                ),
                ..Default::default()
            },
            "/videos/recent.mp4",
            "/videos/recent.vinfo",
        );
        write_history(&config.history_path, &[old.clone(), recent]).unwrap();

        let removed = controller.prune_history(RetentionPeriod::Week).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(controller.history().unwrap(), vec![old]);

        let removed = controller.prune_history(RetentionPeriod::All).unwrap();
        assert_eq!(removed, 1);
        assert!(controller.history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_download_dir_creates_directory() {
        let dir = TempDir::new().unwrap();
        let (mut controller, _events) = controller_with(&dir, Arc::new(InstantEngine));

        let elsewhere = dir.path().join("elsewhere").join("nested");
        controller.set_download_dir(&elsewhere).unwrap();

        assert!(elsewhere.is_dir());
        assert_eq!(controller.download_dir(), elsewhere);
        assert!(controller.list_videos().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_original_url_and_missing_sidecar() {
        let dir = TempDir::new().unwrap();
        let (controller, _events) = controller_with(&dir, Arc::new(InstantEngine));

        let media = dir.path().join("clip.mp4");
        std::fs::write(&media, b"fake video").unwrap();
        write_descriptor(
            &vinfo_path_for(&media),
            &AssetDescriptor {
                source_url: Some("https://example.com/watch?v=abc".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(
            controller.original_url(&media).unwrap(),
            "https://example.com/watch?v=abc"
        );

        let orphan = dir.path().join("orphan.mp4");
        std::fs::write(&orphan, b"fake video").unwrap();
        assert_matches!(
            controller.original_url(&orphan),
            Err(SessionError::Library(LibraryError::NotFound(_)))
        );
    }

    #[cfg(unix)]
    mod playback {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn fake_player(dir: &TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("fake-player.sh");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn playback_controller(
            dir: &TempDir,
            player_body: &str,
        ) -> (SessionController, UnboundedReceiver<SessionEvent>, PathBuf) {
            let player = fake_player(dir, player_body);
            let media = dir.path().join("clip.mp4");
            std::fs::write(&media, b"fake video").unwrap();

            let (controller, events) = SessionController::with_collaborators(
                test_config(dir),
                Arc::new(InstantEngine),
                Arc::new(PlaybackEngine::with_program(player.to_str().unwrap())),
            );
            (controller, events, media)
        }

        #[tokio::test]
        async fn test_playback_to_completion() {
            let dir = TempDir::new().unwrap();
            let (mut controller, mut events, media) = playback_controller(&dir, "exit 0");

            controller.start(TaskSpec::Playback { path: media }).await;
            let collected = drain_until_terminal(&mut events).await;
            controller.stop().await;

            assert_matches!(collected[0], SessionEvent::Started(TaskKind::Playback));
            assert_matches!(
                collected.last(),
                Some(SessionEvent::Finished(TaskOutcome::PlaybackEnded))
            );
        }

        #[tokio::test]
        async fn test_stop_kills_playback() {
            let dir = TempDir::new().unwrap();
            let (mut controller, mut events, media) = playback_controller(&dir, "sleep 30");

            controller.start(TaskSpec::Playback { path: media }).await;
            assert_eq!(controller.status(), SessionStatus::Playing);
            controller.stop().await;

            let collected = drain_until_terminal(&mut events).await;
            assert_matches!(collected.last(), Some(SessionEvent::Stopped));
            assert_eq!(controller.status(), SessionStatus::Idle);
        }

        #[tokio::test]
        async fn test_player_failure_reported() {
            let dir = TempDir::new().unwrap();
            let (mut controller, mut events, media) =
                playback_controller(&dir, "echo 'no decoder' >&2; exit 1");

            controller.start(TaskSpec::Playback { path: media }).await;
            let collected = drain_until_terminal(&mut events).await;
            controller.stop().await;

            assert_matches!(
                collected.last(),
                Some(SessionEvent::Failed(message)) if message.contains("no decoder")
            );
        }
    }
}
