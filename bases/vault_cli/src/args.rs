use clap::{Parser, Subcommand};
use std::path::PathBuf;

use video_downloader::Resolution;
use video_library::RetentionPeriod;

/// Download, play, and manage videos from the command line
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory where downloaded files are stored
    #[arg(short, long, default_value = "downloads")]
    pub dir: PathBuf,

    /// Location of the download-history file
    #[arg(long, default_value = "data/history.json")]
    pub history_file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download a video (Ctrl-C stops the download)
    Download {
        url: String,

        /// Requested resolution label, e.g. 2160p, 1440p, 1080p, 720p, 480p
        #[arg(short, long, default_value = "1080p")]
        resolution: Resolution,
    },

    /// Play a downloaded file with the external player (Ctrl-C stops it)
    Play { file: PathBuf },

    /// List the downloaded videos in the download directory
    List,

    /// Show the stored metadata of a downloaded file
    Info { file: PathBuf },

    /// Print the original source URL of a downloaded file
    Url {
        file: PathBuf,

        /// Also open the URL in the system browser
        #[arg(long)]
        open: bool,
    },

    /// Print the download history, newest first
    History,

    /// Remove history entries downloaded within the given period
    Prune { period: RetentionPeriod },

    /// Open the download directory in the system file browser
    OpenDir,
}
