use session::{SessionEvent, TaskOutcome};
use video_library::{
    format_size, legacy_to_download_time, AssetDescriptor, HistoryEntry, LibraryItem,
};

pub struct OutputHandler;

impl OutputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn print_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::Started(kind) => println!("{} started", kind),
            SessionEvent::Progress(text) => println!("{}", text),
            SessionEvent::Finished(TaskOutcome::Downloaded {
                path, descriptor, ..
            }) => {
                println!("Downloaded: {}", descriptor.display_title());
                println!("Saved to: {}", path.display());
            }
            SessionEvent::Finished(TaskOutcome::PlaybackEnded) => {
                println!("Playback finished");
            }
            SessionEvent::Failed(message) => eprintln!("Failed: {}", message),
            SessionEvent::Stopped => println!("Stopped"),
        }
    }

    pub fn print_items(&self, items: &[LibraryItem]) {
        if items.is_empty() {
            println!("No videos in the download directory");
            return;
        }

        for item in items {
            let date = item
                .downloaded_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!("{:<50} {:>12} {}", item.file_name, format_size(item.size), date);
        }
    }

    pub fn print_history(&self, history: &[HistoryEntry]) {
        if history.is_empty() {
            println!("Download history is empty");
            return;
        }

        // Newest first
        for entry in history.iter().rev() {
            let time = match (&entry.descriptor.download_time, &entry.timestamp) {
                (Some(time), _) => time.clone(),
                // Legacy stamps render in the modern format; garbage passes through
                (None, Some(legacy)) => {
                    legacy_to_download_time(legacy).unwrap_or_else(|_| legacy.clone())
                }
                (None, None) => "unknown".to_string(),
            };

            println!("Title: {}", entry.descriptor.display_title());
            println!("Time: {}", time);
            println!("Resolution: {}", entry.descriptor.display_resolution());
            println!("Source URL: {}", entry.descriptor.display_source_url());
            println!("File: {}", entry.file_path.display());
            println!("{}", "-".repeat(50));
        }
    }

    pub fn print_info(&self, descriptor: &AssetDescriptor) {
        println!("Title: {}", descriptor.display_title());
        println!("Download time: {}", descriptor.display_download_time());
        println!("Resolution: {}", descriptor.display_resolution());
        println!("Format: {}", descriptor.display_container_format());
        println!("Duration: {}", descriptor.display_duration());
        println!("Upload date: {}", descriptor.display_upload_date());
        println!("Views: {}", descriptor.display_view_count());
        println!("Likes: {}", descriptor.display_like_count());
        println!("Channel: {}", descriptor.display_channel_name());
        println!("Channel URL: {}", descriptor.display_channel_url());
        println!("Source URL: {}", descriptor.display_source_url());
        println!("Description: {}", descriptor.display_description());
    }

    pub fn print_pruned(&self, removed: usize) {
        println!("Removed {} history entries", removed);
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("Error: {}", error);
    }
}
