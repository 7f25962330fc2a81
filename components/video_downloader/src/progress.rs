use std::fmt;

/// One parsed progress report from the engine's stdout
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Percent complete, 0.0 to 100.0
    pub percent: f32,
    /// Transfer rate as reported, e.g. "1.50MiB/s"
    pub rate: Option<String>,
}

impl fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "download progress: {:.1}% speed: {}",
            self.percent,
            self.rate.as_deref().unwrap_or("N/A")
        )
    }
}

/// Parse one `--newline` progress line from yt-dlp
///
/// Lines look like `[download]  42.7% of 120.50MiB at 1.50MiB/s ETA 00:55`;
/// the final line replaces the rate with `in <elapsed>`. Anything that is
/// not a download progress line yields None.
pub fn parse_progress_line(line: &str) -> Option<ProgressUpdate> {
    let rest = line.trim().strip_prefix("[download]")?.trim();

    let mut tokens = rest.split_whitespace();
    let percent_token = tokens.next()?;
    let percent: f32 = percent_token.strip_suffix('%')?.parse().ok()?;

    let mut rate = None;
    let mut tokens = tokens.peekable();
    while let Some(token) = tokens.next() {
        if token == "at" {
            rate = tokens.peek().map(|r| r.to_string());
            break;
        }
    }

    Some(ProgressUpdate { percent, rate })
}
