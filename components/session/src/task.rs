use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use playback_engine::{PlaybackEngine, PlaybackOutcome};
use video_downloader::{DownloadEngine, Resolution, VideoDownloader};
use video_library::AssetDescriptor;

use crate::events::TaskKind;

/// What the next worker should do
#[derive(Debug, Clone)]
pub enum TaskSpec {
    Download { url: String, resolution: Resolution },
    Playback { path: PathBuf },
}

impl TaskSpec {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Download { .. } => TaskKind::Download,
            Self::Playback { .. } => TaskKind::Playback,
        }
    }
}

/// Signal from the worker to the controller's event pump
///
/// Per worker run: `Progress*` followed by exactly one terminal signal.
#[derive(Debug)]
pub(crate) enum WorkerEvent {
    Progress(String),
    Downloaded {
        path: PathBuf,
        descriptor: AssetDescriptor,
    },
    PlaybackEnded,
    Failed(String),
    Stopped,
}

/// Run one worker to termination
///
/// The worker owns all blocking work (network extraction, subprocess I/O)
/// and reports through the channel; it never touches shared state itself.
pub(crate) async fn run_worker(
    spec: TaskSpec,
    engine: Arc<dyn DownloadEngine + Send + Sync>,
    player: Arc<PlaybackEngine>,
    download_dir: PathBuf,
    cancel: CancellationToken,
    tx: UnboundedSender<WorkerEvent>,
) {
    match spec {
        TaskSpec::Download { url, resolution } => {
            run_download(&url, &resolution, engine, &download_dir, cancel, tx).await
        }
        TaskSpec::Playback { path } => run_playback(&path, player, cancel, tx).await,
    }
}

async fn run_download(
    url: &str,
    resolution: &Resolution,
    engine: Arc<dyn DownloadEngine + Send + Sync>,
    download_dir: &Path,
    cancel: CancellationToken,
    tx: UnboundedSender<WorkerEvent>,
) {
    let downloader = match VideoDownloader::with_engine(download_dir, engine).await {
        Ok(downloader) => downloader,
        Err(e) => {
            let _ = tx.send(WorkerEvent::Failed(e.to_string()));
            return;
        }
    };

    // Forward engine progress as display text. The forwarder drains to
    // channel close, so awaiting it below guarantees every progress event
    // precedes the terminal one.
    let (progress_tx, mut progress_rx) =
        tokio::sync::mpsc::unbounded_channel::<video_downloader::ProgressUpdate>();
    let forward_tx = tx.clone();
    let forwarder = tokio::spawn(async move {
        while let Some(update) = progress_rx.recv().await {
            let _ = forward_tx.send(WorkerEvent::Progress(update.to_string()));
        }
    });

    tokio::select! {
        result = downloader.download(url, resolution, progress_tx) => {
            let _ = forwarder.await;
            match result {
                Ok((path, descriptor)) => {
                    let _ = tx.send(WorkerEvent::Progress(
                        "download complete, processing...".to_string(),
                    ));
                    let _ = tx.send(WorkerEvent::Downloaded { path, descriptor });
                }
                Err(e) => {
                    let _ = tx.send(WorkerEvent::Failed(e.to_string()));
                }
            }
        }
        _ = cancel.cancelled() => {
            // Dropping the download future tears down the engine process
            debug!("download cancelled");
            let _ = forwarder.await;
            let _ = tx.send(WorkerEvent::Stopped);
        }
    }
}

async fn run_playback(
    path: &Path,
    player: Arc<PlaybackEngine>,
    cancel: CancellationToken,
    tx: UnboundedSender<WorkerEvent>,
) {
    let event = match player.play(path, &cancel).await {
        Ok(PlaybackOutcome::Finished) => WorkerEvent::PlaybackEnded,
        Ok(PlaybackOutcome::Stopped) => WorkerEvent::Stopped,
        Err(e) => WorkerEvent::Failed(e.to_string()),
    };
    let _ = tx.send(event);
}
