use color_eyre::eyre::eyre;
use color_eyre::Result;

use session::{SessionConfig, SessionController, SessionEvent, TaskSpec};

use crate::args::{Args, Command};
use crate::output::OutputHandler;

pub struct App {
    args: Args,
    output: OutputHandler,
}

impl App {
    pub fn new(args: Args) -> Self {
        Self {
            args,
            output: OutputHandler::new(),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let config = SessionConfig {
            download_dir: self.args.dir.clone(),
            history_path: self.args.history_file.clone(),
        };
        let (mut controller, events) = SessionController::new(config)?;

        match self.args.command {
            Command::Download { ref url, ref resolution } => {
                let spec = TaskSpec::Download {
                    url: url.clone(),
                    resolution: resolution.clone(),
                };
                self.run_task(&mut controller, events, spec).await
            }
            Command::Play { ref file } => {
                let spec = TaskSpec::Playback { path: file.clone() };
                self.run_task(&mut controller, events, spec).await
            }
            Command::List => {
                self.output.print_items(&controller.list_videos()?);
                Ok(())
            }
            Command::Info { ref file } => {
                self.output.print_info(&controller.video_info(file)?);
                Ok(())
            }
            Command::Url { ref file, open } => {
                let url = controller.original_url(file)?;
                println!("{}", url);
                if open {
                    open_in_system(&url)?;
                }
                Ok(())
            }
            Command::History => {
                self.output.print_history(&controller.history()?);
                Ok(())
            }
            Command::Prune { period } => {
                self.output.print_pruned(controller.prune_history(period)?);
                Ok(())
            }
            Command::OpenDir => {
                std::fs::create_dir_all(controller.download_dir())?;
                open_in_system(&controller.download_dir().display().to_string())?;
                Ok(())
            }
        }
    }

    /// Drive one worker task to termination, printing events as they come.
    /// Ctrl-C stops the task cleanly before returning.
    async fn run_task(
        &self,
        controller: &mut SessionController,
        mut events: tokio::sync::mpsc::UnboundedReceiver<SessionEvent>,
        spec: TaskSpec,
    ) -> Result<()> {
        controller.start(spec).await;

        loop {
            tokio::select! {
                maybe_event = events.recv() => {
                    let Some(event) = maybe_event else {
                        return Ok(());
                    };
                    self.output.print_event(&event);

                    if let SessionEvent::Failed(ref message) = event {
                        controller.stop().await;
                        return Err(eyre!("{}", message));
                    }
                    if event.is_terminal() {
                        controller.stop().await;
                        return Ok(());
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    controller.stop().await;
                    // The stop flushed any remaining events; print them
                    while let Ok(event) = events.try_recv() {
                        self.output.print_event(&event);
                    }
                    return Ok(());
                }
            }
        }
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }
}

/// Open a path or URL with the platform's default handler
fn open_in_system(target: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = std::process::Command::new("explorer");
        c.arg(target);
        c
    };
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = std::process::Command::new("open");
        c.arg(target);
        c
    };
    #[cfg(all(unix, not(target_os = "macos")))]
    let mut command = {
        let mut c = std::process::Command::new("xdg-open");
        c.arg(target);
        c
    };

    command
        .spawn()
        .map(|_| ())
        .map_err(|e| eyre!("could not open {}: {}", target, e))
}
